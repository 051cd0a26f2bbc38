//! Sample-rate interrupt consumer.
//!
//! [`PlaybackEngine`] is the interrupt half of a session. Once per sample
//! period it pulls one frame of slots from the ring, pushes duty values to the
//! [`DutyActuator`], and wakes a blocked writer when space opens up.
//!
//! ## Channel fan-out
//!
//! ```text
//!  source   wired      slot 0            slot 1
//!  ──────   ─────      ──────            ──────
//!  mono     L          → L               -
//!  mono     L+R        → L and R         -
//!  mono     R          → R               -
//!  stereo   L+R        → L               → R
//!  stereo   L          → L               drained
//!  stereo   R          drained           → R
//! ```
//!
//! A stereo source always consumes two slots per period, so producer and
//! consumer stay frame-aligned whatever is wired.
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! #[task(binds = TG0_T0_LEVEL, local = [engine], priority = 3)]
//! fn sample_tick(cx: sample_tick::Context) {
//!     // alarm already cleared and re-armed by the timer driver
//!     if cx.local.engine.on_timer() {
//!         writer::spawn().ok();
//!     }
//! }
//! ```

use crate::config::Channel;
use crate::constants::BUFFER_MIN_SIZE;
use crate::hal::DutyActuator;
use crate::io::ring::RingBuffer;
use crate::stream::{State, Stream};

/// Interrupt-side consumer of a [`Stream`].
///
/// Created by [`Session::init`](crate::session::Session::init). Never
/// allocates, blocks or fails; an empty ring leaves the previous duty in
/// effect.
pub struct PlaybackEngine<'a, A, const N: usize> {
    stream: &'a Stream<N>,
    actuator: A,
    /// Last duty pushed to each channel.
    last: [Option<u16>; 2],
}

impl<'a, A, const N: usize> PlaybackEngine<'a, A, N>
where
    A: DutyActuator,
{
    pub(crate) fn new(stream: &'a Stream<N>, actuator: A) -> Self {
        PlaybackEngine {
            stream,
            actuator,
            last: [None; 2],
        }
    }

    /// Handle one sample period.
    ///
    /// Call from the timer interrupt after the alarm has been re-armed. Does
    /// nothing unless the session is running.
    ///
    /// # Returns
    ///
    /// `true` if the blocked writer was woken and the caller should request a
    /// switch to it on interrupt exit.
    pub fn on_timer(&mut self) -> bool {
        if self.stream.state() != State::Busy {
            return false;
        }

        let layout = self.stream.layout();
        let ring = self.stream.ring();
        let width = layout.slot_width as usize;

        // Slot 0 is the left channel of a stereo frame or the mono sample.
        let first = read_slot(ring, width);
        if layout.mask.contains(Channel::Left) {
            self.push(Channel::Left, first);
        }

        if layout.channels == 2 {
            let second = read_slot(ring, width);
            if layout.mask.contains(Channel::Right) {
                self.push(Channel::Right, second);
            }
        } else if layout.mask.contains(Channel::Right) {
            self.push(Channel::Right, first);
        }

        self.stream
            .signal()
            .signal_if_needed(ring.free(), BUFFER_MIN_SIZE)
    }

    /// Last duty value applied to `channel`, if any.
    pub fn last_duty(&self, channel: Channel) -> Option<u16> {
        self.last[channel as usize]
    }

    /// The duty sink.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Mutable access to the duty sink, e.g. to adjust a channel between
    /// periods.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub(crate) fn is_bound_to(&self, stream: &Stream<N>) -> bool {
        core::ptr::eq(self.stream, stream)
    }

    pub(crate) fn into_actuator(self) -> A {
        self.actuator
    }

    fn push(&mut self, channel: Channel, value: Option<u16>) {
        if let Some(value) = value {
            self.actuator.set_duty(channel, value);
            self.last[channel as usize] = Some(value);
        }
    }
}

/// Read one slot of `width` bytes, or nothing if the whole slot is not there.
#[inline(always)]
fn read_slot<const N: usize>(ring: &RingBuffer<N>, width: usize) -> Option<u16> {
    if ring.count() < width {
        return None;
    }

    let low = ring.read_byte()?;
    if width == 1 {
        return Some(low as u16);
    }
    let high = ring.read_byte()?;
    Some(u16::from_le_bytes([low, high]))
}
