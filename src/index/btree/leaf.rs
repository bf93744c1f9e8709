//! Leaf nodes: keys paired with record pointers.

use std::fmt;

use log::trace;

use crate::common::BlockId;
use crate::storage::page::{Block, NodeHeader, NodeKind, SlotBuffer};

use super::layout::NodeLayout;
use super::node::{decode_slots, encode_slots, fmt_slots, search, InsertOutcome, SlotSearch};

/// A leaf node.
///
/// `keys[i]` pairs with `pointers[i]`. Leaves are linked left to right
/// through `right_sibling`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    id: BlockId,
    right_sibling: Option<BlockId>,
    keys: SlotBuffer,
    pointers: SlotBuffer,
    /// Set while descending. Not stored.
    parent: Option<BlockId>,
}

impl LeafNode {
    /// Create an empty leaf for block `id`.
    pub fn new(id: BlockId, layout: &NodeLayout) -> Self {
        Self {
            id,
            right_sibling: None,
            keys: SlotBuffer::with_capacity(layout.key_capacity()),
            pointers: SlotBuffer::with_capacity(layout.leaf_pointer_capacity()),
            parent: None,
        }
    }

    /// Decode a leaf from its block. The caller has checked the header.
    pub(crate) fn decode(data: &[u8], layout: &NodeLayout) -> Self {
        let header = NodeHeader::from_bytes(data);
        let (keys, pointers) = decode_slots(data, layout, layout.leaf_pointer_capacity());
        Self {
            id: header.node_id,
            right_sibling: header.right_sibling,
            keys,
            pointers,
            parent: None,
        }
    }

    pub fn encode(&self, layout: &NodeLayout) -> Block {
        let header = NodeHeader {
            node_id: self.id,
            kind: NodeKind::Leaf,
            right_sibling: self.right_sibling,
        };
        encode_slots(&header, &self.keys, &self.pointers, layout)
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn right_sibling(&self) -> Option<BlockId> {
        self.right_sibling
    }

    pub fn set_right_sibling(&mut self, sibling: Option<BlockId>) {
        self.right_sibling = sibling;
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

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.used()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True when the node holds more than `order` keys and must split.
    #[inline]
    pub fn is_overfull(&self, layout: &NodeLayout) -> bool {
        self.len() > layout.order()
    }

    pub fn keys(&self) -> Vec<i32> {
        self.keys.values().collect()
    }

    /// Stored (key, pointer) pairs in key order.
    pub fn entries(&self) -> Vec<(i32, i32)> {
        self.keys
            .values()
            .enumerate()
            .map(|(slot, key)| (key, self.pointers.get(slot)))
            .collect()
    }

    /// Insert `key` → `pointer`, or replace the pointer if `key` is present.
    ///
    /// The leaf may end up holding `order + 1` keys; the caller splits it.
    ///
    /// # Panics
    /// Panics if the leaf is already overfull.
    pub fn insert(&mut self, key: i32, pointer: i32) -> InsertOutcome {
        match search(&self.keys, key) {
            SlotSearch::Found(slot) => {
                trace!("leaf {}: updating key {} at slot {}", self.id.0, key, slot);
                self.pointers.set(slot, pointer);
                InsertOutcome::Updated
            }
            SlotSearch::Vacant(slot) if slot == self.keys.used() => {
                trace!("leaf {}: appending key {}", self.id.0, key);
                self.keys.append(key);
                self.pointers.append(pointer);
                InsertOutcome::Inserted
            }
            SlotSearch::Vacant(slot) => {
                trace!("leaf {}: inserting key {} at slot {}", self.id.0, key, slot);
                self.keys.insert_at(slot, key);
                self.pointers.insert_at(slot, pointer);
                InsertOutcome::Inserted
            }
        }
    }

    /// Look up the record pointer stored for `key`.
    pub fn get(&self, key: i32) -> Option<i32> {
        match search(&self.keys, key) {
            SlotSearch::Found(slot) => Some(self.pointers.get(slot)),
            SlotSearch::Vacant(_) => None,
        }
    }

    /// Split an overfull leaf, moving its upper half into a new leaf `right_id`.
    ///
    /// The first `ceil((order + 1) / 2)` pairs stay here. The new leaf is
    /// linked in after this one. Returns the separator (the new leaf's first
    /// key) and the new leaf.
    pub fn split(&mut self, right_id: BlockId, layout: &NodeLayout) -> (i32, LeafNode) {
        let split_at = layout.leaf_split_point();
        let used = self.keys.used();

        let mut right = LeafNode::new(right_id, layout);
        for slot in split_at..used {
            right.insert(self.keys.get(slot), self.pointers.get(slot));
        }
        self.keys.clear_from(split_at);
        self.pointers.clear_from(split_at);

        right.right_sibling = self.right_sibling;
        self.right_sibling = Some(right_id);
        right.parent = self.parent;

        (right.keys.get(0), right)
    }
}

impl fmt::Display for LeafNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafNode {} keys ", self.id.0)?;
        fmt_slots(f, self.keys.values())?;
        write!(f, " pointers ")?;
        fmt_slots(f, (0..self.len()).map(|slot| self.pointers.get(slot)))?;
        match self.right_sibling {
            Some(sibling) => write!(f, " right {}", sibling.0),
            None => write!(f, " right none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::MIN_BLOCK_SIZE;
    use crate::index::btree::node::Node;

    fn layout(order: usize) -> NodeLayout {
        NodeLayout::new((13 + 8 * order).max(MIN_BLOCK_SIZE)).unwrap()
    }

    fn leaf_with(id: u32, keys: &[i32], layout: &NodeLayout) -> LeafNode {
        let mut leaf = LeafNode::new(BlockId::new(id), layout);
        for &k in keys {
            leaf.insert(k, k * 10);
        }
        leaf
    }

    #[test]
    fn test_insert_keeps_keys_sorted() {
        let layout = layout(4);
        let leaf = leaf_with(1, &[30, 10, 40, 20], &layout);
        assert_eq!(leaf.keys(), vec![10, 20, 30, 40]);
        assert_eq!(leaf.entries(), vec![(10, 100), (20, 200), (30, 300), (40, 400)]);
    }

    #[test]
    fn test_insert_existing_key_updates() {
        let layout = layout(3);
        let mut leaf = leaf_with(1, &[10, 20], &layout);

        assert_eq!(leaf.insert(20, 7), InsertOutcome::Updated);
        assert_eq!(leaf.len(), 2);
        assert_eq!(leaf.get(20), Some(7));
    }

    #[test]
    fn test_get_missing() {
        let layout = layout(3);
        let leaf = leaf_with(1, &[10, 20], &layout);
        assert_eq!(leaf.get(15), None);
        assert_eq!(leaf.get(0), None);
        assert_eq!(LeafNode::new(BlockId::new(1), &layout).get(10), None);
    }

    #[test]
    fn test_overfull_after_order_plus_one() {
        let layout = layout(3);
        let mut leaf = leaf_with(1, &[1, 2, 3], &layout);
        assert!(!leaf.is_overfull(&layout));

        leaf.insert(4, 40);
        assert!(leaf.is_overfull(&layout));
    }

    #[test]
    fn test_split_order_3() {
        let layout = layout(3);
        let mut left = leaf_with(1, &[10, 20, 30, 40], &layout);
        left.set_right_sibling(Some(BlockId::new(7)));

        let (separator, right) = left.split(BlockId::new(5), &layout);

        assert_eq!(separator, 30);
        assert_eq!(left.keys(), vec![10, 20]);
        assert_eq!(right.entries(), vec![(30, 300), (40, 400)]);
        assert_eq!(left.right_sibling(), Some(BlockId::new(5)));
        assert_eq!(right.right_sibling(), Some(BlockId::new(7)));
    }

    #[test]
    fn test_split_order_4_keeps_ceiling_half() {
        let layout = layout(4);
        let mut left = leaf_with(2, &[1, 2, 3, 4, 5], &layout);

        let (separator, right) = left.split(BlockId::new(3), &layout);

        assert_eq!(left.keys(), vec![1, 2, 3]);
        assert_eq!(right.keys(), vec![4, 5]);
        assert_eq!(separator, 4);
        assert_eq!(right.right_sibling(), None);
    }

    #[test]
    fn test_split_clears_moved_slots() {
        let layout = layout(3);
        let mut left = leaf_with(1, &[1, 2, 3, 4], &layout);
        left.split(BlockId::new(2), &layout);

        let block = left.encode(&layout);
        let data = block.as_slice();
        // keys region: slots 2 and 3 zeroed
        assert_eq!(&data[layout.keys_offset() + 8..layout.pointers_offset()], &[0; 4]);
        assert!(data[layout.pointers_offset() + 8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let layout = layout(5);
        let mut leaf = leaf_with(9, &[-3, 8, 12, 40], &layout);
        leaf.set_right_sibling(Some(BlockId::new(11)));

        let block = leaf.encode(&layout);
        assert_eq!(block.len(), layout.block_size());

        match Node::decode(block.as_slice(), BlockId::new(9), &layout).unwrap() {
            Node::Leaf(decoded) => assert_eq!(decoded, leaf),
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_encoded_byte_layout() {
        let layout = layout(3);
        let leaf = leaf_with(1, &[10], &layout);
        let block = leaf.encode(&layout);
        let data = block.as_slice();

        assert_eq!(&data[0..4], &[0, 0, 0, 1]); // node id
        assert_eq!(data[4], 1); // is_leaf
        assert_eq!(&data[5..9], &[0, 0, 0, 0]); // no right sibling
        assert_eq!(&data[9..13], &[0, 0, 0, 10]); // first key
        assert_eq!(&data[21..25], &[0, 0, 0, 100]); // first pointer
    }

    #[test]
    fn test_display() {
        let layout = layout(3);
        let mut leaf = leaf_with(4, &[1, 2], &layout);
        leaf.set_right_sibling(Some(BlockId::new(6)));
        assert_eq!(
            leaf.to_string(),
            "LeafNode 4 keys [ 1 2 ] pointers [ 10 20 ] right 6"
        );
    }
}
