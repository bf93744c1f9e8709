//! Configuration constants for blockindex.
//!
//! The block size is chosen by the caller at open time; everything else about
//! the on-disk geometry is fixed here.

/// Size of a stored key in bytes (big-endian `i32`).
pub const KEY_SIZE: usize = 4;

/// Size of a stored pointer in bytes (big-endian `i32`).
///
/// Pointers are either record pointers (in leaves) or child block ids
/// (in internal nodes).
pub const POINTER_SIZE: usize = 4;

/// Bytes reserved at the start of every node block.
///
/// # Layout
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     node_id (equals the block index)
/// 4       1     is_leaf
/// 5       4     right sibling (leaves only, 0 if none)
/// ```
pub const NODE_HEADER_SIZE: usize = 9;

/// Smallest order a tree may be opened with.
pub const MIN_ORDER: usize = 3;

/// Smallest block size an index may be opened with.
///
/// Enforced on its own: 37 bytes already gives [`MIN_ORDER`] under the
/// order formula but is still rejected.
pub const MIN_BLOCK_SIZE: usize = 38;

/// Block size used when the caller has no preference (4KB).
///
/// Matches the OS page size on most systems.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Number of keys a node holds for a given block size.
///
/// `order = floor((block_size - 9 - pointer_size) / (key_size + pointer_size))`
///
/// Returns 0 for block sizes too small to hold even the fixed header.
pub const fn order_for_block_size(block_size: usize) -> usize {
    if block_size < NODE_HEADER_SIZE + POINTER_SIZE {
        return 0;
    }
    (block_size - NODE_HEADER_SIZE - POINTER_SIZE) / (KEY_SIZE + POINTER_SIZE)
}
