//! Byte codecs for the on-disk format.
//!
//! Every integer in an index file is a 4-byte big-endian `i32` and every flag
//! is a single byte. These helpers read and write them at fixed offsets.
//!
//! # Panics
//! All functions panic if the offset range is outside the slice. Offsets are
//! computed from the node layout, so an out-of-range offset is a bug.

use std::cmp::Ordering;

/// Read a big-endian `i32` at `offset`.
#[inline]
pub fn read_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Write `value` as a big-endian `i32` at `offset`.
#[inline]
pub fn write_i32(data: &mut [u8], offset: usize, value: i32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Read a one-byte flag. Only `1` is true.
#[inline]
pub fn read_bool(data: &[u8], offset: usize) -> bool {
    data[offset] == 1
}

/// Write a one-byte flag (`1` or `0`).
#[inline]
pub fn write_bool(data: &mut [u8], offset: usize, value: bool) {
    data[offset] = u8::from(value);
}

/// Compare two byte strings as unsigned bytes.
///
/// On a shared prefix the shorter string is less. Keys on the lookup path are
/// compared as `i32`; this is for raw block contents.
pub fn compare_unsigned(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}
