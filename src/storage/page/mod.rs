//! Block and node page formats.
//!
//! This module contains:
//! - [`Block`] - The raw fixed-size data container
//! - [`SlotBuffer`] - Zero-terminated runs of 32-bit slots
//! - [`NodeHeader`] - Metadata at the start of every node block
//! - [`NodeKind`] - Leaf or internal discriminator

mod block;
mod node_header;
mod slot_buffer;

pub use block::Block;
pub use node_header::{NodeHeader, NodeKind};
pub use slot_buffer::{SlotBuffer, SLOT_SIZE};
