//! Node geometry derived from the block size.

use crate::common::config::{
    order_for_block_size, KEY_SIZE, MIN_BLOCK_SIZE, MIN_ORDER, NODE_HEADER_SIZE, POINTER_SIZE,
};
use crate::common::{Error, Result};

/// Immutable geometry shared by every node of one tree.
///
/// Computed once when the index is opened and borrowed by every node
/// operation.
///
/// # Node Block Layout
/// ```text
/// ┌────────────┬────────────────────┬──────────────────────────┬─────────┐
/// │ header (9) │ keys (order × 4)   │ pointers ((order+1) × 4) │ unused  │
/// └────────────┴────────────────────┴──────────────────────────┴─────────┘
/// ```
///
/// In memory both buffers carry one extra overflow slot, so a node can hold
/// `order + 1` keys between an insert and the split that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    block_size: usize,
    order: usize,
}

impl NodeLayout {
    /// Derive the layout for `block_size`.
    ///
    /// # Errors
    /// Returns `Error::BlockSizeTooSmall` if `block_size` is below
    /// [`MIN_BLOCK_SIZE`] or the order would be below 3.
    pub fn new(block_size: usize) -> Result<Self> {
        let order = order_for_block_size(block_size);
        if block_size < MIN_BLOCK_SIZE || order < MIN_ORDER {
            return Err(Error::BlockSizeTooSmall { block_size, order });
        }
        Ok(Self { block_size, order })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Maximum number of keys a node holds at rest.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn key_size(&self) -> usize {
        KEY_SIZE
    }

    #[inline]
    pub fn pointer_size(&self) -> usize {
        POINTER_SIZE
    }

    /// In-memory key slots (both node kinds).
    #[inline]
    pub fn key_capacity(&self) -> usize {
        self.order + 1
    }

    /// In-memory pointer slots of a leaf.
    #[inline]
    pub fn leaf_pointer_capacity(&self) -> usize {
        self.order + 1
    }

    /// In-memory pointer slots of an internal node.
    #[inline]
    pub fn internal_pointer_capacity(&self) -> usize {
        self.order + 2
    }

    /// Key slots stored on disk.
    #[inline]
    pub fn stored_keys(&self) -> usize {
        self.order
    }

    /// Pointer slots stored on disk.
    #[inline]
    pub fn stored_pointers(&self) -> usize {
        self.order + 1
    }

    #[inline]
    pub fn keys_offset(&self) -> usize {
        NODE_HEADER_SIZE
    }

    #[inline]
    pub fn pointers_offset(&self) -> usize {
        NODE_HEADER_SIZE + KEY_SIZE * self.stored_keys()
    }

    /// Bytes a node actually uses in its block.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.pointers_offset() + POINTER_SIZE * self.stored_pointers()
    }

    /// Keys kept by the left leaf of a split: `ceil((order + 1) / 2)`.
    #[inline]
    pub fn leaf_split_point(&self) -> usize {
        (self.order + 1).div_ceil(2)
    }

    /// Keys kept by the left internal node of a split: `ceil(order / 2)`.
    #[inline]
    pub fn internal_key_split_point(&self) -> usize {
        self.order.div_ceil(2)
    }

    /// Pointers kept by the left internal node of a split:
    /// `ceil((order + 2) / 2)`.
    ///
    /// Always one past the key split point, since pointer 0 has no key.
    #[inline]
    pub fn internal_pointer_split_point(&self) -> usize {
        (self.order + 2).div_ceil(2)
    }
}
