//! Node header and kind definitions.
//!
//! Every node block starts with a [`NodeHeader`]:
//! - the node's own block id
//! - the [`NodeKind`] flag
//! - the right-sibling link (leaves only)

use crate::common::bytes::{read_bool, read_i32, write_bool, write_i32};
use crate::common::config::NODE_HEADER_SIZE;
use crate::common::BlockId;

/// Kind of node stored in a block.
///
/// Stored as the one-byte `is_leaf` flag, so the discriminants are fixed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Internal node: separator keys and child block ids.
    Internal = 0,
    /// Leaf node: keys and record pointers.
    Leaf = 1,
}

impl NodeKind {
    #[inline]
    pub fn is_leaf(self) -> bool {
        self == NodeKind::Leaf
    }

    #[inline]
    pub fn from_is_leaf(is_leaf: bool) -> Self {
        if is_leaf {
            NodeKind::Leaf
        } else {
            NodeKind::Internal
        }
    }
}

/// Metadata stored at the beginning of every node block.
///
/// # Layout (9 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     node_id (big-endian, equals the block index)
/// 4       1     is_leaf (1 = leaf, 0 = internal)
/// 5       4     right_sibling (big-endian, 0 = none; always 0 for internal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Block this node is stored in.
    pub node_id: BlockId,
    /// Leaf or internal.
    pub kind: NodeKind,
    /// Next leaf to the right, if any.
    pub right_sibling: Option<BlockId>,
}

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = NODE_HEADER_SIZE;

    /// Offset of each field within the header.
    pub const OFFSET_NODE_ID: usize = 0;
    pub const OFFSET_IS_LEAF: usize = 4;
    pub const OFFSET_RIGHT_SIBLING: usize = 5;

    /// Create a header with no right sibling.
    pub fn new(node_id: BlockId, kind: NodeKind) -> Self {
        Self {
            node_id,
            kind,
            right_sibling: None,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        Self {
            node_id: BlockId::new(read_i32(data, Self::OFFSET_NODE_ID) as u32),
            kind: NodeKind::from_is_leaf(read_bool(data, Self::OFFSET_IS_LEAF)),
            right_sibling: BlockId::from_slot(read_i32(data, Self::OFFSET_RIGHT_SIBLING)),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        write_i32(data, Self::OFFSET_NODE_ID, self.node_id.to_slot());
        write_bool(data, Self::OFFSET_IS_LEAF, self.kind.is_leaf());
        write_i32(
            data,
            Self::OFFSET_RIGHT_SIBLING,
            self.right_sibling.map_or(0, BlockId::to_slot),
        );
    }

    /// Peek at the kind flag of an encoded node.
    #[inline]
    pub fn kind_of(data: &[u8]) -> NodeKind {
        NodeKind::from_is_leaf(read_bool(data, Self::OFFSET_IS_LEAF))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_flag() {
        assert!(NodeKind::Leaf.is_leaf());
        assert!(!NodeKind::Internal.is_leaf());
        assert_eq!(NodeKind::from_is_leaf(true), NodeKind::Leaf);
        assert_eq!(NodeKind::Leaf as u8, 1);
        assert_eq!(NodeKind::Internal as u8, 0);
    }

    #[test]
    fn test_node_header_roundtrip() {
        let original = NodeHeader {
            node_id: BlockId::new(12),
            kind: NodeKind::Leaf,
            right_sibling: Some(BlockId::new(40)),
        };

        let mut buffer = [0u8; NodeHeader::SIZE];
        original.write_to(&mut buffer);

        assert_eq!(NodeHeader::from_bytes(&buffer), original);
        assert_eq!(NodeHeader::kind_of(&buffer), NodeKind::Leaf);
    }

    #[test]
    fn test_node_header_byte_layout() {
        let header = NodeHeader {
            node_id: BlockId::new(0x01020304),
            kind: NodeKind::Leaf,
            right_sibling: Some(BlockId::new(0x05)),
        };

        let mut buffer = [0u8; NodeHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer, [0x01, 0x02, 0x03, 0x04, 1, 0, 0, 0, 0x05]);
    }

    #[test]
    fn test_internal_header_has_no_sibling() {
        let header = NodeHeader::new(BlockId::new(3), NodeKind::Internal);

        let mut buffer = [0xFFu8; NodeHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(&buffer[5..9], &[0, 0, 0, 0]);
        assert_eq!(NodeHeader::from_bytes(&buffer).right_sibling, None);
    }
}
