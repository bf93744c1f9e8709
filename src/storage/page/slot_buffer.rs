//! SlotBuffer - fixed-capacity array of 32-bit slots.
//!
//! Node keys and pointers are stored as runs of 4-byte big-endian slots. A
//! slot holding 0 is empty, and the first empty slot ends the used region, so
//! the buffer carries its own length without a count field.

use std::fmt;

use crate::common::bytes::{read_i32, write_i32};

/// Width of one slot in bytes.
pub const SLOT_SIZE: usize = 4;

/// A fixed number of big-endian `i32` slots.
///
/// # Zero Sentinel
/// 0 is never a stored value. `used()` scans from the start for the first
/// zero slot, so writing 0 into the middle of the used region truncates it.
///
/// # Example
/// ```
/// use blockindex::storage::page::SlotBuffer;
///
/// let mut slots = SlotBuffer::with_capacity(4);
/// slots.append(10);
/// slots.append(30);
/// slots.insert_at(1, 20);
/// assert_eq!(slots.values().collect::<Vec<_>>(), vec![10, 20, 30]);
/// assert_eq!(slots.last_used_offset(), 12);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SlotBuffer {
    data: Vec<u8>,
}

impl SlotBuffer {
    /// Create a buffer of `capacity` empty slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity * SLOT_SIZE],
        }
    }

    /// Create a buffer of `capacity` slots initialized from `bytes`.
    ///
    /// Slots past the end of `bytes` start empty.
    ///
    /// # Panics
    /// Panics if `bytes` is longer than the buffer or not slot-aligned.
    pub fn from_bytes(bytes: &[u8], capacity: usize) -> Self {
        assert!(
            bytes.len() <= capacity * SLOT_SIZE,
            "{} bytes do not fit in {} slots",
            bytes.len(),
            capacity
        );
        assert_eq!(bytes.len() % SLOT_SIZE, 0, "slot bytes must be 4-aligned");

        let mut buffer = Self::with_capacity(capacity);
        buffer.data[..bytes.len()].copy_from_slice(bytes);
        buffer
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len() / SLOT_SIZE
    }

    /// Read slot `slot`.
    #[inline]
    pub fn get(&self, slot: usize) -> i32 {
        read_i32(&self.data, slot * SLOT_SIZE)
    }

    /// Overwrite slot `slot`.
    #[inline]
    pub fn set(&mut self, slot: usize, value: i32) {
        write_i32(&mut self.data, slot * SLOT_SIZE, value);
    }

    /// Number of used slots: the index of the first empty slot, or the
    /// capacity when every slot is used.
    pub fn used(&self) -> usize {
        (0..self.capacity())
            .find(|&slot| self.get(slot) == 0)
            .unwrap_or_else(|| self.capacity())
    }

    /// Byte offset just past the last used slot.
    ///
    /// Equals the byte length of the buffer when it is full.
    #[inline]
    pub fn last_used_offset(&self) -> usize {
        self.used() * SLOT_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.get(0) == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.used() == self.capacity()
    }

    /// Write `value` into the first empty slot.
    ///
    /// Returns `false` and leaves the buffer unchanged if there is none.
    pub fn append(&mut self, value: i32) -> bool {
        let used = self.used();
        if used == self.capacity() {
            return false;
        }
        self.set(used, value);
        true
    }

    /// Insert `value` at `slot`, shifting the used tail one slot right.
    ///
    /// # Panics
    /// Panics if the buffer is full or `slot` is past the used region.
    pub fn insert_at(&mut self, slot: usize, value: i32) {
        let used = self.used();
        assert!(used < self.capacity(), "insert into a full slot buffer");
        assert!(slot <= used, "insert at slot {} past used length {}", slot, used);

        let start = slot * SLOT_SIZE;
        let end = used * SLOT_SIZE;
        self.data.copy_within(start..end, start + SLOT_SIZE);
        self.set(slot, value);
    }

    /// Zero every slot from `slot` onward.
    ///
    /// # Panics
    /// Panics if `slot` is past the capacity.
    pub fn clear_from(&mut self, slot: usize) {
        assert!(slot <= self.capacity(), "clear from slot {} past capacity", slot);
        self.data[slot * SLOT_SIZE..].fill(0);
    }

    /// The used values, in slot order.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.used()).map(move |slot| self.get(slot))
    }

    /// The first `slots` slots as raw big-endian bytes.
    #[inline]
    pub fn prefix_bytes(&self, slots: usize) -> &[u8] {
        &self.data[..slots * SLOT_SIZE]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for SlotBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.capacity()).map(|slot| self.get(slot)))
            .finish()
    }
}
