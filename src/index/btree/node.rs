//! Behavior shared by leaf and internal nodes.
//!
//! A node block is a [`NodeHeader`] followed by a key run and a pointer run,
//! both fixed length (see [`NodeLayout`]). Decoding copies the runs into
//! [`SlotBuffer`]s with one spare slot each; encoding writes them back.

use std::cmp::Ordering;
use std::fmt;

use crate::common::{BlockId, Error, Result};
use crate::storage::page::{Block, NodeHeader, NodeKind, SlotBuffer, SLOT_SIZE};

use super::internal::InternalNode;
use super::layout::NodeLayout;
use super::leaf::LeafNode;

/// What an insert did to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new key was added.
    Inserted,
    /// The key was present; its pointer was replaced.
    Updated,
}

/// Where a key belongs in a sorted key run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotSearch {
    /// The key is stored at this slot.
    Found(usize),
    /// The key is absent and belongs at this slot.
    Vacant(usize),
}

/// Linear scan for the first stored key not less than `key`.
pub(crate) fn search(keys: &SlotBuffer, key: i32) -> SlotSearch {
    for (slot, stored) in keys.values().enumerate() {
        match key.cmp(&stored) {
            Ordering::Equal => return SlotSearch::Found(slot),
            Ordering::Less => return SlotSearch::Vacant(slot),
            Ordering::Greater => {}
        }
    }
    SlotSearch::Vacant(keys.used())
}

/// Split the key and pointer runs out of an encoded node.
pub(crate) fn decode_slots(
    data: &[u8],
    layout: &NodeLayout,
    pointer_capacity: usize,
) -> (SlotBuffer, SlotBuffer) {
    let keys_start = layout.keys_offset();
    let pointers_start = layout.pointers_offset();
    let pointers_end = pointers_start + layout.stored_pointers() * SLOT_SIZE;

    let keys = SlotBuffer::from_bytes(&data[keys_start..pointers_start], layout.key_capacity());
    let pointers = SlotBuffer::from_bytes(&data[pointers_start..pointers_end], pointer_capacity);
    (keys, pointers)
}

/// Encode a node into a full block.
///
/// Only the stored slots are written; the overflow slots must be empty.
pub(crate) fn encode_slots(
    header: &NodeHeader,
    keys: &SlotBuffer,
    pointers: &SlotBuffer,
    layout: &NodeLayout,
) -> Block {
    debug_assert!(keys.used() <= layout.stored_keys(), "encoding an overfull node");

    let mut block = Block::new(layout.block_size());
    let data = block.as_mut_slice();
    header.write_to(data);

    let keys_start = layout.keys_offset();
    let pointers_start = layout.pointers_offset();
    data[keys_start..pointers_start].copy_from_slice(keys.prefix_bytes(layout.stored_keys()));
    data[pointers_start..layout.encoded_len()]
        .copy_from_slice(pointers.prefix_bytes(layout.stored_pointers()));

    block
}

/// A decoded node of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl Node {
    /// Decode the node stored in block `id`.
    ///
    /// # Errors
    /// Returns `Error::Corrupted` if the block has the wrong size or its
    /// stored node id is not `id`.
    pub fn decode(data: &[u8], id: BlockId, layout: &NodeLayout) -> Result<Node> {
        if data.len() != layout.block_size() {
            return Err(Error::Corrupted(format!(
                "{} has {} bytes, expected {}",
                id,
                data.len(),
                layout.block_size()
            )));
        }

        let header = NodeHeader::from_bytes(data);
        if header.node_id != id {
            return Err(Error::Corrupted(format!(
                "{} holds node id {}",
                id, header.node_id.0
            )));
        }

        Ok(match header.kind {
            NodeKind::Leaf => Node::Leaf(LeafNode::decode(data, layout)),
            NodeKind::Internal => Node::Internal(InternalNode::decode(data, layout)),
        })
    }

    pub fn encode(&self, layout: &NodeLayout) -> Block {
        match self {
            Node::Leaf(leaf) => leaf.encode(layout),
            Node::Internal(internal) => internal.encode(layout),
        }
    }

    pub fn id(&self) -> BlockId {
        match self {
            Node::Leaf(leaf) => leaf.id(),
            Node::Internal(internal) => internal.id(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Parent in the current traversal. Never persisted.
    pub fn parent(&self) -> Option<BlockId> {
        match self {
            Node::Leaf(leaf) => leaf.parent(),
            Node::Internal(internal) => internal.parent(),
        }
    }

    pub fn set_parent(&mut self, parent: Option<BlockId>) {
        match self {
            Node::Leaf(leaf) => leaf.set_parent(parent),
            Node::Internal(internal) => internal.set_parent(parent),
        }
    }

    /// True unless a parent was attached during the current traversal.
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Sorted keys stored in this node.
    pub fn keys(&self) -> Vec<i32> {
        match self {
            Node::Leaf(leaf) => leaf.keys(),
            Node::Internal(internal) => internal.keys(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => fmt::Display::fmt(leaf, f),
            Node::Internal(internal) => fmt::Display::fmt(internal, f),
        }
    }
}

/// Render a run of slots as `[ a b c ]`.
pub(crate) fn fmt_slots(f: &mut fmt::Formatter<'_>, values: impl Iterator<Item = i32>) -> fmt::Result {
    write!(f, "[")?;
    for value in values {
        write!(f, " {}", value)?;
    }
    write!(f, " ]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> NodeLayout {
        NodeLayout::new(38).unwrap()
    }

    fn keys_of(values: &[i32]) -> SlotBuffer {
        let mut slots = SlotBuffer::with_capacity(4);
        for &v in values {
            slots.append(v);
        }
        slots
    }

    #[test]
    fn test_search() {
        let keys = keys_of(&[10, 20, 30]);
        assert_eq!(search(&keys, 5), SlotSearch::Vacant(0));
        assert_eq!(search(&keys, 10), SlotSearch::Found(0));
        assert_eq!(search(&keys, 25), SlotSearch::Vacant(2));
        assert_eq!(search(&keys, 30), SlotSearch::Found(2));
        assert_eq!(search(&keys, 99), SlotSearch::Vacant(3));
        assert_eq!(search(&keys_of(&[]), 1), SlotSearch::Vacant(0));
    }

    #[test]
    fn test_search_negative_keys() {
        let keys = keys_of(&[-20, -5, 7]);
        assert_eq!(search(&keys, -10), SlotSearch::Vacant(1));
        assert_eq!(search(&keys, -20), SlotSearch::Found(0));
    }

    #[test]
    fn test_decode_dispatches_on_kind() {
        let layout = layout();

        let mut leaf = LeafNode::new(BlockId::new(1), &layout);
        leaf.insert(5, 50);
        let block = leaf.encode(&layout);
        let node = Node::decode(block.as_slice(), BlockId::new(1), &layout).unwrap();
        assert!(node.is_leaf());
        assert!(node.is_root());
        assert_eq!(node.keys(), vec![5]);

        let internal = InternalNode::new_root(
            BlockId::new(3),
            BlockId::new(1),
            9,
            BlockId::new(2),
            &layout,
        );
        let block = internal.encode(&layout);
        let node = Node::decode(block.as_slice(), BlockId::new(3), &layout).unwrap();
        assert!(!node.is_leaf());
        assert_eq!(node.id(), BlockId::new(3));
    }

    #[test]
    fn test_decode_rejects_wrong_block() {
        let layout = layout();
        let leaf = LeafNode::new(BlockId::new(1), &layout);
        let block = leaf.encode(&layout);

        let result = Node::decode(block.as_slice(), BlockId::new(2), &layout);
        assert!(matches!(result, Err(Error::Corrupted(_))));

        let result = Node::decode(&block.as_slice()[..20], BlockId::new(1), &layout);
        assert!(matches!(result, Err(Error::Corrupted(_))));
    }

    #[test]
    fn test_parent_is_transient() {
        let layout = layout();
        let mut node = Node::Leaf(LeafNode::new(BlockId::new(4), &layout));
        node.set_parent(Some(BlockId::new(9)));
        assert!(!node.is_root());

        let block = node.encode(&layout);
        let decoded = Node::decode(block.as_slice(), BlockId::new(4), &layout).unwrap();
        assert!(decoded.is_root());
    }
}
