//! Tree header stored in block 0.

use std::fmt;

use crate::common::bytes::{read_bool, read_i32, write_bool, write_i32};
use crate::common::config::{order_for_block_size, KEY_SIZE, POINTER_SIZE};
use crate::common::{BlockId, Error, Result};

/// Metadata stored in the header block.
///
/// # Layout (11 bytes, rest of block 0 is zero)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     block_size (big-endian)
/// 4       1     key_size (always 4)
/// 5       1     pointer_size (always 4)
/// 6       4     root_block_id (big-endian, 0 = empty tree)
/// 10      1     root_is_leaf (1 = leaf)
/// ```
///
/// The order is not stored; it is derived from `block_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHeader {
    pub block_size: usize,
    pub key_size: u8,
    pub pointer_size: u8,
    /// Root node, or `None` before the first insert.
    pub root: Option<BlockId>,
    pub root_is_leaf: bool,
}

impl TreeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 11;

    pub const OFFSET_BLOCK_SIZE: usize = 0;
    pub const OFFSET_KEY_SIZE: usize = 4;
    pub const OFFSET_POINTER_SIZE: usize = 5;
    pub const OFFSET_ROOT: usize = 6;
    pub const OFFSET_ROOT_IS_LEAF: usize = 10;

    /// Header of an empty tree.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            key_size: KEY_SIZE as u8,
            pointer_size: POINTER_SIZE as u8,
            root: None,
            root_is_leaf: false,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < TreeHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for TreeHeader");

        Self {
            block_size: read_i32(data, Self::OFFSET_BLOCK_SIZE) as u32 as usize,
            key_size: data[Self::OFFSET_KEY_SIZE],
            pointer_size: data[Self::OFFSET_POINTER_SIZE],
            root: BlockId::from_slot(read_i32(data, Self::OFFSET_ROOT)),
            root_is_leaf: read_bool(data, Self::OFFSET_ROOT_IS_LEAF),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < TreeHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for TreeHeader");

        write_i32(data, Self::OFFSET_BLOCK_SIZE, self.block_size as i32);
        data[Self::OFFSET_KEY_SIZE] = self.key_size;
        data[Self::OFFSET_POINTER_SIZE] = self.pointer_size;
        write_i32(data, Self::OFFSET_ROOT, self.root.map_or(0, BlockId::to_slot));
        write_bool(data, Self::OFFSET_ROOT_IS_LEAF, self.root_is_leaf);
    }

    /// Check a header read from disk against the block size it was opened with.
    ///
    /// # Errors
    /// - `Error::BlockSizeMismatch` if the stored block size differs
    /// - `Error::Corrupted` if the key or pointer size is not 4
    pub fn validate(&self, block_size: usize) -> Result<()> {
        if self.block_size != block_size {
            return Err(Error::BlockSizeMismatch {
                expected: block_size,
                found: self.block_size,
            });
        }
        if self.key_size as usize != KEY_SIZE || self.pointer_size as usize != POINTER_SIZE {
            return Err(Error::Corrupted(format!(
                "header has key size {} and pointer size {}, expected {} and {}",
                self.key_size, self.pointer_size, KEY_SIZE, POINTER_SIZE
            )));
        }
        Ok(())
    }

    /// Order derived from the stored block size.
    #[inline]
    pub fn order(&self) -> usize {
        order_for_block_size(self.block_size)
    }
}

impl fmt::Display for TreeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- HEADER INFO ---")?;
        writeln!(f, "Block size: {}", self.block_size)?;
        writeln!(f, "Key size: {}", self.key_size)?;
        writeln!(f, "Pointer size: {}", self.pointer_size)?;
        writeln!(f, "Root ID: {}", self.root.map_or(0, |id| id.0))?;
        writeln!(f, "Root is leaf: {}", self.root_is_leaf)?;
        writeln!(f, "Tree order (not stored in header): {}", self.order())?;
        write!(f, "--- END HEADER INFO ---")
    }
}
