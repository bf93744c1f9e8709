//! Block identifier type.

use std::fmt;

/// Identifies a block in the index file.
///
/// Block N lives at file offset `N × block_size`. Block 0 always holds the
/// tree header, so no node ever has id 0; that is what lets a zero pointer
/// slot mean "no block".
///
/// # Example
/// ```
/// use blockindex::BlockId;
///
/// let id = BlockId::new(42);
/// assert!(!id.is_header());
/// assert_eq!(BlockId::from_slot(id.to_slot()), Some(id));
/// assert_eq!(BlockId::from_slot(0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The header block.
    pub const HEADER: BlockId = BlockId(0);

    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u32) -> Self {
        BlockId(id)
    }

    #[inline]
    pub fn is_header(&self) -> bool {
        *self == Self::HEADER
    }

    /// Decode a block id stored in a 32-bit slot.
    ///
    /// Zero and negative values are "no block".
    #[inline]
    pub fn from_slot(value: i32) -> Option<BlockId> {
        if value > 0 {
            Some(BlockId(value as u32))
        } else {
            None
        }
    }

    /// Encode this id for a 32-bit slot.
    #[inline]
    pub fn to_slot(self) -> i32 {
        self.0 as i32
    }

    /// Byte offset of this block in a file of `block_size` blocks.
    #[inline]
    pub fn offset(self, block_size: usize) -> u64 {
        (self.0 as u64) * (block_size as u64)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}
