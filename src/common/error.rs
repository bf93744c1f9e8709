//! Error types for blockindex.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in blockindex.
///
/// The variants fall into four groups:
/// - configuration errors, which must stop the caller from using the index
/// - storage contract violations (bad block index or oversized block)
/// - rejected input and corrupted blocks
/// - I/O errors, which the caller may retry
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The block size is below the minimum of 38 bytes (order 3).
    #[error("block size {block_size} (order {order}) is below the minimum block size 38")]
    BlockSizeTooSmall { block_size: usize, order: usize },

    /// The block size stored in the header differs from the requested one.
    #[error("block size mismatch: index was created with {found}, opened with {expected}")]
    BlockSizeMismatch { expected: usize, found: usize },

    /// A block index past the end of the store.
    #[error("block {block} out of range (store has {len} blocks)")]
    BlockOutOfRange { block: u32, len: u32 },

    /// A write larger than one block.
    #[error("{len} bytes do not fit in a block of {block_size} bytes")]
    BlockOverflow { len: usize, block_size: usize },

    /// Zero marks an empty slot and cannot be stored.
    #[error("{field} 0 is reserved for empty slots")]
    ReservedValue { field: &'static str, value: i32 },

    /// A block that does not decode as what it should be.
    #[error("corrupted index: {0}")]
    Corrupted(String),
}

impl Error {
    /// Whether this error means the index is misconfigured.
    ///
    /// Configuration errors are fatal: the index must not be used.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::BlockSizeTooSmall { .. } | Error::BlockSizeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BlockOutOfRange { block: 7, len: 3 };
        assert_eq!(format!("{}", err), "block 7 out of range (store has 3 blocks)");

        let err = Error::ReservedValue { field: "key", value: 0 };
        assert_eq!(format!("{}", err), "key 0 is reserved for empty slots");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::BlockSizeTooSmall { block_size: 37, order: 2 }.is_configuration());
        assert!(Error::BlockSizeMismatch { expected: 64, found: 38 }.is_configuration());
        assert!(!Error::BlockOutOfRange { block: 1, len: 0 }.is_configuration());
        assert!(!Error::Corrupted("bad".into()).is_configuration());
    }
}
