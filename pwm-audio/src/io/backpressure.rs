//! Binary wake signal between the sample interrupt and the writer task.
//!
//! The writer calls [`arm_and_wait()`](BackpressureSignal::arm_and_wait) when
//! the ring is full. The interrupt calls
//! [`signal_if_needed()`](BackpressureSignal::signal_if_needed) after every
//! sample and wakes the writer once enough space has been freed.
//!
//! ```text
//!   writer task                          sample interrupt
//!   ───────────                          ────────────────
//!   given = false  ──── arm ────►
//!   poll woken (DelayNs)                 if !given && free > threshold:
//!        ◄────────────── wake ─────────      given = true; woken = true
//! ```
//!
//! The `given` guard limits the interrupt to one wake per arm cycle, keeping
//! its cost bounded no matter how long the writer takes to run.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

/// Granularity of the writer's wait loop.
const POLL_INTERVAL_US: u32 = 100;

/// How long a writer may block waiting for ring space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Fail immediately if no wake is pending.
    NoWait,
    /// Give up after this many microseconds.
    Micros(u32),
    /// Wait until woken.
    Forever,
}

impl Timeout {
    /// Timeout from milliseconds, saturating at `u32::MAX` microseconds.
    pub const fn millis(ms: u32) -> Self {
        Timeout::Micros(ms.saturating_mul(1000))
    }
}

/// Wake flag plus "already given" guard.
pub struct BackpressureSignal {
    /// Set by the interrupt, consumed by the waiter.
    woken: AtomicBool,
    /// Set once a wake has been issued since the last arm.
    given: AtomicBool,
}

impl BackpressureSignal {
    /// No wake pending, guard open.
    pub const fn new() -> Self {
        BackpressureSignal {
            woken: AtomicBool::new(false),
            given: AtomicBool::new(false),
        }
    }

    /// Clear the guard, then block until woken or `timeout` elapses.
    ///
    /// Returns `true` if a wake was received. Task context only.
    pub fn arm_and_wait<D: DelayNs>(&self, timeout: Timeout, delay: &mut D) -> bool {
        self.given.store(false, Ordering::Release);

        let mut remaining = match timeout {
            Timeout::NoWait => 0,
            Timeout::Micros(us) => us,
            Timeout::Forever => u32::MAX,
        };

        loop {
            if self.woken.swap(false, Ordering::AcqRel) {
                return true;
            }
            if remaining == 0 {
                return false;
            }

            let step = remaining.min(POLL_INTERVAL_US);
            delay.delay_us(step);
            if timeout != Timeout::Forever {
                remaining -= step;
            }
        }
    }

    /// Wake the writer if no wake is outstanding and `free > threshold`.
    ///
    /// Never blocks. Returns `true` when a wake was issued, so the interrupt
    /// can request a switch to the writer task on exit.
    pub fn signal_if_needed(&self, free: usize, threshold: usize) -> bool {
        if free <= threshold || self.given.load(Ordering::Acquire) {
            return false;
        }

        self.given.store(true, Ordering::Release);
        self.woken.store(true, Ordering::Release);
        true
    }

    /// Whether a wake has been issued and not yet consumed.
    pub fn is_pending(&self) -> bool {
        self.woken.load(Ordering::Acquire)
    }

    /// Drop any pending wake and re-open the guard.
    pub fn reset(&self) {
        self.woken.store(false, Ordering::Release);
        self.given.store(false, Ordering::Release);
    }
}

impl Default for BackpressureSignal {
    fn default() -> Self {
        Self::new()
    }
}
