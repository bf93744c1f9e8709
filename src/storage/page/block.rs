//! Block - the fixed-size unit of storage.
//!
//! A [`Block`] is a raw byte buffer of exactly `block_size` bytes. It is what
//! the [`BlockStore`](crate::storage::BlockStore) reads and writes, and what
//! nodes encode themselves into.

/// One block of data.
///
/// Unlike a fixed 4KB page, the block size is chosen when the index is
/// opened, so the buffer is heap-allocated.
///
/// # Clone Implementation
/// `Block` does NOT implement `Clone` in production code so that copying a
/// block stays explicit. A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use blockindex::storage::page::Block;
///
/// let mut block = Block::new(38);
/// block.as_mut_slice()[0] = 0xFF;
/// assert_eq!(block.as_slice()[0], 0xFF);
/// assert_eq!(block.len(), 38);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    data: Vec<u8>,
}

impl Block {
    /// Create a new zeroed block.
    pub fn new(block_size: usize) -> Self {
        Self {
            data: vec![0u8; block_size],
        }
    }

    /// Get immutable slice of block data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of block data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Size of the block in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Clone only in tests
#[cfg(test)]
impl Clone for Block {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}
