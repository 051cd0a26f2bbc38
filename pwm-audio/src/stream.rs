//! State shared between a session and its playback engine.
//!
//! A [`Stream`] owns the ring buffer, the backpressure signal, the run state
//! and the slot layout the interrupt needs. Everything is atomic, so one
//! stream can sit in a `static` and be borrowed by both the writer task
//! ([`Session`](crate::session::Session)) and the sample interrupt
//! ([`PlaybackEngine`](crate::io::PlaybackEngine)).
//!
//! ```ignore
//! static STREAM: Stream<4096> = Stream::new();
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::ChannelMask;
use crate::io::backpressure::BackpressureSignal;
use crate::io::ring::RingBuffer;

/// Run state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum State {
    /// No session owns the stream.
    Uninitialized = 0,
    /// Configured, interrupt stopped. Parameters may change.
    Idle = 1,
    /// Interrupt running.
    Busy = 2,
}

impl State {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => State::Idle,
            2 => State::Busy,
            _ => State::Uninitialized,
        }
    }
}

/// What the interrupt reads from the ring each period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Source channels per frame (1 or 2).
    pub channels: u8,
    /// Bytes per slot (1 or 2).
    pub slot_width: u8,
    /// Physical outputs to drive.
    pub mask: ChannelMask,
}

/// Ring buffer, wake signal and state for one PWM output pair.
pub struct Stream<const N: usize> {
    ring: RingBuffer<N>,
    signal: BackpressureSignal,
    state: AtomicU8,
    channels: AtomicU8,
    slot_width: AtomicU8,
    mask: AtomicU8,
}

impl<const N: usize> Stream<N> {
    /// An unclaimed stream with an empty ring.
    pub const fn new() -> Self {
        Stream {
            ring: RingBuffer::new(),
            signal: BackpressureSignal::new(),
            state: AtomicU8::new(State::Uninitialized as u8),
            channels: AtomicU8::new(0),
            slot_width: AtomicU8::new(0),
            mask: AtomicU8::new(0),
        }
    }

    /// Current run state.
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Byte ring between the writer and the interrupt.
    pub fn ring(&self) -> &RingBuffer<N> {
        &self.ring
    }

    /// Wake signal from the interrupt to a blocked writer.
    pub fn signal(&self) -> &BackpressureSignal {
        &self.signal
    }

    /// Slot layout the interrupt reads with.
    pub fn layout(&self) -> Layout {
        Layout {
            channels: self.channels.load(Ordering::Relaxed),
            slot_width: self.slot_width.load(Ordering::Relaxed),
            mask: ChannelMask::from_bits(self.mask.load(Ordering::Relaxed)),
        }
    }

    /// Move from `Uninitialized` to `Idle`. `None` if another session holds
    /// the stream.
    pub(crate) fn claim(&self) -> Option<StreamClaim<'_, N>> {
        self.state
            .compare_exchange(
                State::Uninitialized as u8,
                State::Idle as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| StreamClaim { stream: self })
    }

    /// Drop all queued audio and hand the stream back.
    ///
    /// Leaves `Busy` before flushing so a late interrupt finds nothing to do.
    fn release(&self) {
        self.set_state(State::Idle);
        self.ring.flush();
        self.signal.reset();
        self.set_state(State::Uninitialized);
    }

    /// Release ordering makes a layout stored beforehand visible to an
    /// interrupt that observes `Busy`.
    pub(crate) fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Only while the interrupt is stopped.
    pub(crate) fn set_layout(&self, layout: Layout) {
        self.channels.store(layout.channels, Ordering::Relaxed);
        self.slot_width.store(layout.slot_width, Ordering::Relaxed);
        self.mask.store(layout.mask.bits(), Ordering::Relaxed);
    }
}

/// Exclusive hold on a [`Stream`]. Dropping it releases the stream.
pub(crate) struct StreamClaim<'a, const N: usize> {
    stream: &'a Stream<N>,
}

impl<const N: usize> Drop for StreamClaim<'_, N> {
    fn drop(&mut self) {
        self.stream.release();
    }
}

impl<const N: usize> Default for Stream<N> {
    fn default() -> Self {
        Self::new()
    }
}
