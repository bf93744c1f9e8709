//! Common types and utilities shared across blockindex.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - Block identifiers
//! - Big-endian slot codecs

pub mod bytes;
pub mod config;
pub mod error;
mod block_id;

pub use block_id::BlockId;
pub use error::{Error, Result};
