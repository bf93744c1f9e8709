//! Block Store - fixed-block-size file I/O.
//!
//! The [`BlockStore`] handles all direct file operations:
//! - Reading and writing blocks by index
//! - Appending blocks at the end of the file
//! - Counting every block access
//! - Deleting the backing file

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::common::{BlockId, Error, Result};
use crate::storage::page::Block;

/// Manages block I/O for a single index file.
///
/// # File Layout
/// The index is stored as a single file with blocks laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │ Block 2 │  ...    │ Block N │
/// │ header  │  node   │  node   │         │  node   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0       B       2B      ...      N×B
/// ```
///
/// Block N is located at file offset `N × block_size`.
///
/// # Frontier
/// The block at index `len()` is the next free block. Writing there appends;
/// reading there returns zeros. Anything beyond it is out of range.
///
/// # Access Counting
/// Every `read` and `write` increments [`access_count`](Self::access_count).
/// This is the disk-access metric used to compare block sizes.
///
/// # Durability
/// Writes are not synced individually. Call [`flush`](Self::flush) or
/// [`close`](Self::close) to fsync.
#[derive(Debug)]
pub struct BlockStore {
    file: File,
    path: PathBuf,
    block_size: usize,
    /// Number of complete blocks in the file.
    block_count: u32,
    access_count: u64,
}

impl BlockStore {
    /// Open an index file, creating it if it doesn't exist.
    ///
    /// A trailing partial block left by an interrupted write is cut off.
    ///
    /// # Panics
    /// Panics if `block_size` is 0.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        assert!(block_size > 0, "block_size must be > 0");

        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let file_size = file.metadata()?.len();
        let block_count = (file_size / block_size as u64) as u32;

        if file_size % block_size as u64 != 0 {
            let complete = block_count as u64 * block_size as u64;
            warn!(
                "truncating {} trailing bytes from {}",
                file_size - complete,
                path.display()
            );
            file.set_len(complete)?;
        }

        debug!(
            "opened block store {} ({} blocks of {} bytes)",
            path.display(),
            block_count,
            block_size
        );

        Ok(Self {
            file,
            path,
            block_size,
            block_count,
            access_count: 0,
        })
    }

    /// Read a block from disk.
    ///
    /// Reading the frontier block (`id == len()`) returns a zeroed block.
    ///
    /// # Errors
    /// Returns `Error::BlockOutOfRange` if `id > len()`.
    pub fn read(&mut self, id: BlockId) -> Result<Block> {
        if id.0 > self.block_count {
            return Err(Error::BlockOutOfRange {
                block: id.0,
                len: self.block_count,
            });
        }

        self.access_count += 1;

        let mut block = Block::new(self.block_size);
        if id.0 == self.block_count {
            return Ok(block);
        }

        self.file.seek(SeekFrom::Start(id.offset(self.block_size)))?;
        self.file.read_exact(block.as_mut_slice())?;

        Ok(block)
    }

    /// Write a block in place.
    ///
    /// Writing at `id == len()` appends a block. Input shorter than the block
    /// size is zero-padded.
    ///
    /// # Errors
    /// - `Error::BlockOverflow` if `bytes` is longer than a block
    /// - `Error::BlockOutOfRange` if `id > len()`
    pub fn write(&mut self, bytes: &[u8], id: BlockId) -> Result<()> {
        if bytes.len() > self.block_size {
            return Err(Error::BlockOverflow {
                len: bytes.len(),
                block_size: self.block_size,
            });
        }
        if id.0 > self.block_count {
            return Err(Error::BlockOutOfRange {
                block: id.0,
                len: self.block_count,
            });
        }

        self.file.seek(SeekFrom::Start(id.offset(self.block_size)))?;
        self.file.write_all(bytes)?;
        if bytes.len() < self.block_size {
            let padding = vec![0u8; self.block_size - bytes.len()];
            self.file.write_all(&padding)?;
        }

        self.access_count += 1;
        if id.0 == self.block_count {
            self.block_count += 1;
        }

        Ok(())
    }

    /// Write a block at the end of the file.
    ///
    /// Returns the new number of blocks.
    pub fn write_append(&mut self, bytes: &[u8]) -> Result<u32> {
        self.write(bytes, self.frontier())?;
        Ok(self.block_count)
    }

    /// Id the next appended block will get.
    #[inline]
    pub fn frontier(&self) -> BlockId {
        BlockId::new(self.block_count)
    }

    /// Get the number of blocks in the file.
    #[inline]
    pub fn len(&self) -> u32 {
        self.block_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Get the total size of the index file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.block_count as u64) * (self.block_size as u64)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of block reads and writes since open or the last reset.
    #[inline]
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn reset_access_count(&mut self) {
        self.access_count = 0;
    }

    /// Flush written blocks to disk (fsync).
    pub fn flush(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Flush and release the file handle.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    /// Release the file handle and remove the file.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be removed.
    pub fn delete(self) -> Result<()> {
        let BlockStore { file, path, .. } = self;
        drop(file);
        fs::remove_file(&path)?;
        debug!("deleted block store {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        let store = BlockStore::open(&path, 38).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.file_size(), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_write_and_read_block() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 38).unwrap();

        let mut data = vec![0u8; 38];
        data[0] = 0xAB;
        data[37] = 0xEF;

        store.write(&data, BlockId::new(0)).unwrap();
        assert_eq!(store.len(), 1);

        let block = store.read(BlockId::new(0)).unwrap();
        assert_eq!(block.as_slice(), &data[..]);
    }

    #[test]
    fn test_write_append_returns_new_len() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 16).unwrap();

        assert_eq!(store.write_append(&[1u8; 16]).unwrap(), 1);
        assert_eq!(store.write_append(&[2u8; 16]).unwrap(), 2);
        assert_eq!(store.frontier(), BlockId::new(2));
        assert_eq!(store.read(BlockId::new(1)).unwrap().as_slice()[0], 2);
    }

    #[test]
    fn test_short_write_is_padded() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 16).unwrap();

        store.write_append(&[0xFFu8; 16]).unwrap();
        store.write(&[7, 7], BlockId::new(0)).unwrap();

        let block = store.read(BlockId::new(0)).unwrap();
        assert_eq!(&block.as_slice()[..3], &[7, 7, 0]);
        assert_eq!(block.as_slice()[15], 0);
    }

    #[test]
    fn test_oversized_write_fails() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 16).unwrap();

        let result = store.write(&[0u8; 17], BlockId::new(0));
        assert!(matches!(result, Err(Error::BlockOverflow { len: 17, .. })));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_write_past_frontier_fails() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 16).unwrap();

        let result = store.write(&[0u8; 16], BlockId::new(1));
        assert!(matches!(
            result,
            Err(Error::BlockOutOfRange { block: 1, len: 0 })
        ));
    }

    #[test]
    fn test_read_frontier_is_zeroed() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 16).unwrap();
        store.write_append(&[9u8; 16]).unwrap();

        let block = store.read(BlockId::new(1)).unwrap();
        assert!(block.as_slice().iter().all(|&b| b == 0));
        assert_eq!(store.len(), 1);

        assert!(store.read(BlockId::new(2)).is_err());
    }

    #[test]
    fn test_access_counting() {
        let dir = tempdir().unwrap();
        let mut store = BlockStore::open(dir.path().join("test.idx"), 16).unwrap();

        store.write_append(&[1u8; 16]).unwrap();
        store.write(&[2u8; 16], BlockId::new(0)).unwrap();
        store.read(BlockId::new(0)).unwrap();
        assert_eq!(store.access_count(), 3);

        // Rejected accesses don't count
        let _ = store.read(BlockId::new(5));
        assert_eq!(store.access_count(), 3);

        store.reset_access_count();
        assert_eq!(store.access_count(), 0);
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        {
            let mut store = BlockStore::open(&path, 16).unwrap();
            store.write_append(&[0x42u8; 16]).unwrap();
            store.close().unwrap();
        }

        {
            let mut store = BlockStore::open(&path, 16).unwrap();
            assert_eq!(store.len(), 1);
            assert_eq!(store.read(BlockId::new(0)).unwrap().as_slice()[0], 0x42);
        }
    }

    #[test]
    fn test_partial_block_truncated_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");
        fs::write(&path, vec![1u8; 16 * 2 + 5]).unwrap();

        let store = BlockStore::open(&path, 16).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(fs::metadata(&path).unwrap().len(), 32);
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        let mut store = BlockStore::open(&path, 16).unwrap();
        store.write_append(&[1u8; 16]).unwrap();
        store.delete().unwrap();

        assert!(!path.exists());
    }
}
