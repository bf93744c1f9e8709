//! Index structures.
//!
//! - [`btree`] - Disk-resident B+-tree over fixed-size blocks

pub mod btree;
