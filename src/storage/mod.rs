//! Storage layer - block I/O and page formats.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] - Fixed-block-size file I/O with access counting
//! - [`page`] - Block, slot and node header layouts

mod block_store;
pub mod page;

pub use block_store::BlockStore;
