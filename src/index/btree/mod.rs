//! Disk-resident B+-tree.
//!
//! # Components
//! - [`NodeLayout`] - Order and slot geometry derived from the block size
//! - [`TreeHeader`] - Block 0: block size, root id, root kind
//! - [`LeafNode`] / [`InternalNode`] - Decoded nodes and their split rules
//! - [`BPlusTree`] - Descent, insertion and split propagation

mod header;
mod internal;
mod layout;
mod leaf;
mod node;
mod tree;

pub use header::TreeHeader;
pub use internal::InternalNode;
pub use layout::NodeLayout;
pub use leaf::LeafNode;
pub use node::{InsertOutcome, Node};
pub use tree::BPlusTree;
