//! Lock-free single-producer single-consumer byte ring.
//!
//! Carries converted duty bytes from the writer task to the sample-rate
//! interrupt. Storage and both indices are atomics, so the ring can live in a
//! `static` and be shared by `&` reference between the two contexts.
//!
//! # Safety Contract
//!
//! - Only ONE context may call the write side ([`write_byte()`](RingBuffer::write_byte),
//!   [`write_slice()`](RingBuffer::write_slice)).
//! - Only ONE context may call [`read_byte()`](RingBuffer::read_byte).
//! - [`flush()`](RingBuffer::flush) may only run while neither side is active.
//!
//! Breaking the contract cannot cause undefined behaviour, but it does lose or
//! repeat bytes.

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Fixed-capacity byte ring of `N` slots.
///
/// The usable capacity is `N - 1`: one slot stays empty so that
/// `head == tail` always means empty and `head + 1 == tail` means full.
pub struct RingBuffer<const N: usize> {
    buffer: [AtomicU8; N],
    /// Next write position (only modified by the producer).
    head: AtomicUsize,
    /// Next read position (only modified by the consumer).
    tail: AtomicUsize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty ring.
    ///
    /// # Panics
    ///
    /// Compile-time assertion: `N` must be at least 2.
    pub const fn new() -> Self {
        assert!(N >= 2, "ring buffer must have at least 2 slots (1 usable)");

        RingBuffer {
            buffer: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Total number of slots, including the one kept empty.
    pub const fn size(&self) -> usize {
        N
    }

    /// Maximum number of bytes the ring can hold.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Store one byte (producer side).
    ///
    /// Returns `false`, leaving the ring unchanged, if it is full.
    pub fn write_byte(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next_head = (head + 1) % N;

        if next_head == self.tail.load(Ordering::Acquire) {
            return false;
        }

        self.buffer[head].store(byte, Ordering::Relaxed);
        // Release publishes the byte before the consumer can see the new head.
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Store all of `bytes` or none of them (producer side).
    ///
    /// `head` is published once, after the last byte, so the consumer never
    /// observes a partially written frame.
    pub fn write_slice(&self, bytes: &[u8]) -> bool {
        if bytes.len() > self.free() {
            return false;
        }

        let mut head = self.head.load(Ordering::Relaxed);
        for &byte in bytes {
            self.buffer[head].store(byte, Ordering::Relaxed);
            head = (head + 1) % N;
        }

        self.head.store(head, Ordering::Release);
        true
    }

    /// Take one byte (consumer side).
    ///
    /// Returns `None` if the ring is empty. Constant time; safe for
    /// interrupt context.
    pub fn read_byte(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);

        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        let byte = self.buffer[tail].load(Ordering::Relaxed);

        // Release hands the slot back to the producer only after the read.
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(byte)
    }

    /// Number of bytes currently stored.
    pub fn count(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    /// Number of bytes that can be written before the ring is full.
    pub fn free(&self) -> usize {
        N - self.count() - 1
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether the next write would fail.
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Discard everything by resetting both indices to zero.
    ///
    /// Only call while the consumer interrupt is disabled.
    pub fn flush(&self) {
        self.tail.store(0, Ordering::Release);
        self.head.store(0, Ordering::Release);
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
