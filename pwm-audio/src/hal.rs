//! Collaborator traits for the timer and the PWM outputs.
//!
//! The streaming core never touches registers. A target provides a
//! [`HardwareTimer`] that fires the sample interrupt and a [`DutyActuator`]
//! that drives the outputs. [`PwmChannels`] implements the actuator for any
//! pair of `embedded-hal` PWM channels.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::{valid_duty_resolution, Channel, ChannelMask, Config};

/// Periodic timer that invokes [`PlaybackEngine::on_timer()`](crate::io::PlaybackEngine::on_timer)
/// once per sample period.
///
/// The interrupt handler is expected to clear and re-arm the alarm before
/// calling into the engine.
pub trait HardwareTimer {
    /// Error type for timer operations.
    type Error;

    /// Program the alarm so the interrupt fires `sample_rate_hz` times per
    /// second. Must take effect before the next interrupt.
    fn set_period(&mut self, sample_rate_hz: u32) -> Result<(), Self::Error>;

    /// Start counting.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Stop counting. The current period is abandoned.
    fn pause(&mut self) -> Result<(), Self::Error>;

    /// Let the alarm raise the sample interrupt.
    fn enable_interrupt(&mut self);

    /// Mask the sample interrupt.
    ///
    /// Must not return while a handler is still running
    /// [`PlaybackEngine::on_timer()`](crate::io::PlaybackEngine::on_timer):
    /// the caller flushes the ring right after. Trivially true when the
    /// handler runs on the same core as the caller.
    fn disable_interrupt(&mut self);
}

/// Alarm compare value for an auto-reloading timer.
///
/// `base_clock_hz / divider` ticks per second, divided into `sample_rate_hz`
/// periods. Use with [`TIMER_DIVIDER`](crate::constants::TIMER_DIVIDER) when
/// implementing [`HardwareTimer::set_period`].
pub const fn alarm_ticks(base_clock_hz: u32, divider: u32, sample_rate_hz: u32) -> u32 {
    (base_clock_hz / divider) / sample_rate_hz
}

/// Per-channel duty sink.
///
/// Called from interrupt context: implementations must be bounded in time and
/// must not block.
pub trait DutyActuator {
    /// Outputs this actuator can drive.
    fn channels(&self) -> ChannelMask;

    /// Apply `value` (`0..2^resolution`) to `channel`. Takes effect within
    /// one sample period.
    fn set_duty(&mut self, channel: Channel, value: u16);

    /// Stop driving `channel` and leave it low.
    fn release(&mut self, _channel: Channel) {}
}

/// [`DutyActuator`] over one or two `embedded-hal` PWM channels.
///
/// Duty values are scaled from `0..2^duty_resolution` onto each channel's
/// own `max_duty_cycle()`. Errors from the channels are ignored: the
/// interrupt has nowhere to report them and the previous duty stays in
/// effect.
pub struct PwmChannels<L, R> {
    left: Option<L>,
    right: Option<R>,
    full_scale: u16,
}

impl<L, R> PwmChannels<L, R>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
{
    /// Wrap the wired channels. A `None` channel is reported as absent from
    /// [`channels()`](DutyActuator::channels).
    ///
    /// Pass the same `config` as to [`Session::init`](crate::session::Session::init):
    /// duty values arrive in `0..2^config.duty_resolution` and are scaled
    /// against that range. Returns `None` if the resolution is out of range.
    pub fn new(left: Option<L>, right: Option<R>, config: &Config) -> Option<Self> {
        if !valid_duty_resolution(config.duty_resolution) {
            return None;
        }
        Some(PwmChannels {
            left,
            right,
            full_scale: 1 << config.duty_resolution,
        })
    }

    /// Give the channels back.
    pub fn free(self) -> (Option<L>, Option<R>) {
        (self.left, self.right)
    }
}

impl<L, R> DutyActuator for PwmChannels<L, R>
where
    L: SetDutyCycle,
    R: SetDutyCycle,
{
    fn channels(&self) -> ChannelMask {
        let mut mask = ChannelMask::NONE;
        if self.left.is_some() {
            mask = mask.with(Channel::Left);
        }
        if self.right.is_some() {
            mask = mask.with(Channel::Right);
        }
        mask
    }

    fn set_duty(&mut self, channel: Channel, value: u16) {
        let value = value.min(self.full_scale - 1);
        match channel {
            Channel::Left => {
                if let Some(pwm) = self.left.as_mut() {
                    let _ = pwm.set_duty_cycle_fraction(value, self.full_scale);
                }
            }
            Channel::Right => {
                if let Some(pwm) = self.right.as_mut() {
                    let _ = pwm.set_duty_cycle_fraction(value, self.full_scale);
                }
            }
        }
    }

    fn release(&mut self, channel: Channel) {
        match channel {
            Channel::Left => {
                if let Some(pwm) = self.left.as_mut() {
                    let _ = pwm.set_duty_cycle_fully_off();
                }
            }
            Channel::Right => {
                if let Some(pwm) = self.right.as_mut() {
                    let _ = pwm.set_duty_cycle_fully_off();
                }
            }
        }
    }
}
