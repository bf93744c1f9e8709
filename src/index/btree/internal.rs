//! Internal nodes: separator keys and child block ids.

use std::fmt;

use log::trace;

use crate::common::BlockId;
use crate::storage::page::{Block, NodeHeader, NodeKind, SlotBuffer};

use super::layout::NodeLayout;
use super::node::{decode_slots, encode_slots, fmt_slots, search, InsertOutcome, SlotSearch};

/// An internal node.
///
/// # Routing
/// ```text
///  pointers:  p0      p1      p2      p3
///  keys:          k0      k1      k2
///
///  p0 covers key < k0, p(i+1) covers k(i) <= key < k(i+1),
///  the last pointer covers key >= the greatest key
/// ```
///
/// Pointer slot `i + 1` belongs to key slot `i`; slot 0 is the smallest
/// pointer and has no key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    id: BlockId,
    keys: SlotBuffer,
    pointers: SlotBuffer,
    /// Set while descending. Not stored.
    parent: Option<BlockId>,
}

impl InternalNode {
    /// Create an empty internal node for block `id`.
    ///
    /// Set the smallest pointer before inserting separators.
    pub fn new(id: BlockId, layout: &NodeLayout) -> Self {
        Self {
            id,
            keys: SlotBuffer::with_capacity(layout.key_capacity()),
            pointers: SlotBuffer::with_capacity(layout.internal_pointer_capacity()),
            parent: None,
        }
    }

    /// Create the new root above a split: `left` < `separator` <= `right`.
    pub fn new_root(
        id: BlockId,
        left: BlockId,
        separator: i32,
        right: BlockId,
        layout: &NodeLayout,
    ) -> Self {
        let mut root = Self::new(id, layout);
        root.set_smallest_pointer(left);
        root.insert(separator, right);
        root
    }

    /// Decode an internal node from its block. The caller has checked the header.
    pub(crate) fn decode(data: &[u8], layout: &NodeLayout) -> Self {
        let header = NodeHeader::from_bytes(data);
        let (keys, pointers) = decode_slots(data, layout, layout.internal_pointer_capacity());
        Self {
            id: header.node_id,
            keys,
            pointers,
            parent: None,
        }
    }

    pub fn encode(&self, layout: &NodeLayout) -> Block {
        let header = NodeHeader::new(self.id, NodeKind::Internal);
        encode_slots(&header, &self.keys, &self.pointers, layout)
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<BlockId>) {
        self.parent = parent;
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of stored separator keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.used()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn is_overfull(&self, layout: &NodeLayout) -> bool {
        self.len() > layout.order()
    }

    pub fn keys(&self) -> Vec<i32> {
        self.keys.values().collect()
    }

    /// Child block ids in routing order, smallest pointer first.
    pub fn children(&self) -> Vec<BlockId> {
        self.pointers.values().filter_map(BlockId::from_slot).collect()
    }

    /// Put `child` in front of every existing child.
    pub fn set_smallest_pointer(&mut self, child: BlockId) {
        trace!("internal {}: smallest pointer {}", self.id.0, child.0);
        self.pointers.insert_at(0, child.to_slot());
    }

    /// Insert separator `key` with the child to its right, or repoint the
    /// child of an existing separator.
    ///
    /// # Panics
    /// Panics if the node is already overfull or has no smallest pointer.
    pub fn insert(&mut self, key: i32, child: BlockId) -> InsertOutcome {
        debug_assert_eq!(
            self.pointers.used(),
            self.keys.used() + 1,
            "internal node without a smallest pointer"
        );

        match search(&self.keys, key) {
            SlotSearch::Found(slot) => {
                trace!("internal {}: repointing key {} to {}", self.id.0, key, child.0);
                self.pointers.set(slot + 1, child.to_slot());
                InsertOutcome::Updated
            }
            SlotSearch::Vacant(slot) => {
                trace!("internal {}: inserting key {} -> {} at slot {}", self.id.0, key, child.0, slot);
                self.keys.insert_at(slot, key);
                self.pointers.insert_at(slot + 1, child.to_slot());
                InsertOutcome::Inserted
            }
        }
    }

    /// Child subtree that may contain `key`.
    ///
    /// Returns `None` only for a node with an empty pointer slot where a
    /// child should be.
    pub fn get(&self, key: i32) -> Option<BlockId> {
        let child = self
            .keys
            .values()
            .take_while(|&separator| key >= separator)
            .count();
        BlockId::from_slot(self.pointers.get(child))
    }

    /// Split an overfull node, moving its upper part into a new node `right_id`.
    ///
    /// The first `ceil(order / 2)` keys and `ceil((order + 2) / 2)` pointers
    /// stay here. The first moved key becomes the separator and is not kept
    /// in either node; the first moved pointer becomes the new node's
    /// smallest pointer. Returns the separator and the new node.
    pub fn split(&mut self, right_id: BlockId, layout: &NodeLayout) -> (i32, InternalNode) {
        let key_split = layout.internal_key_split_point();
        let pointer_split = layout.internal_pointer_split_point();
        let used_keys = self.keys.used();
        let used_pointers = self.pointers.used();

        let separator = self.keys.get(key_split);

        let mut right = InternalNode::new(right_id, layout);
        right.set_smallest_pointer(self.child_at(pointer_split));
        for (key_slot, pointer_slot) in (key_split + 1..used_keys).zip(pointer_split + 1..used_pointers) {
            right.insert(self.keys.get(key_slot), self.child_at(pointer_slot));
        }

        self.keys.clear_from(key_split);
        self.pointers.clear_from(pointer_split);
        right.parent = self.parent;

        (separator, right)
    }

    #[inline]
    fn child_at(&self, slot: usize) -> BlockId {
        BlockId::new(self.pointers.get(slot) as u32)
    }
}

impl fmt::Display for InternalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternalNode {} keys ", self.id.0)?;
        fmt_slots(f, self.keys.values())?;
        write!(f, " pointers ")?;
        fmt_slots(f, self.pointers.values())
    }
}
