//! blockindex - A disk-resident B+-tree index over fixed-size blocks.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           blockindex                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree/)                 │   │
//! │  │   BPlusTree → descent path → LeafNode / InternalNode    │   │
//! │  │        TreeHeader (block 0) + NodeLayout (order)        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                   │   │
//! │  │     BlockStore + Block + NodeHeader + SlotBuffer        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, byte helpers, config)
//! - [`storage`] - Block file I/O and node block formats
//! - [`index`] - The B+-tree
//!
//! # Quick Start
//! ```no_run
//! use blockindex::BPlusTree;
//!
//! // Create (or reopen) an index with 4 KiB blocks
//! let mut tree = BPlusTree::open("my_index.dat", 4096).unwrap();
//!
//! tree.insert(17, 4242).unwrap();
//! assert_eq!(tree.lookup(17).unwrap(), Some(4242));
//!
//! tree.close().unwrap();
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_BLOCK_SIZE, MIN_BLOCK_SIZE};
pub use common::{BlockId, Error, Result};

pub use index::btree::{BPlusTree, Node, TreeHeader};
pub use storage::BlockStore;
