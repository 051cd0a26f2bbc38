//! Session configuration and playback parameters.
//!
//! [`Config`] describes the timer and PWM precision and is fixed for the
//! lifetime of a session; the wired outputs come from the
//! [`DutyActuator`](crate::hal::DutyActuator). [`Params`] describes the PCM
//! stream and may change while the session is idle.

use crate::constants::*;

/// A physical PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Left = 0,
    Right = 1,
}

impl Channel {
    /// Both channels, left first.
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    /// Mask containing only this channel.
    pub const fn mask(self) -> ChannelMask {
        ChannelMask(1 << self as u8)
    }
}

/// Set of physical outputs that are wired to an actuator.
///
/// Independent of how many channels the source audio carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const NONE: Self = ChannelMask(0);
    pub const LEFT: Self = ChannelMask(0b01);
    pub const RIGHT: Self = ChannelMask(0b10);
    pub const BOTH: Self = ChannelMask(0b11);

    /// Build a mask from raw bits. Bits above the right channel are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        ChannelMask(bits & Self::BOTH.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & channel.mask().0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// This mask with `channel` added.
    pub const fn with(self, channel: Channel) -> Self {
        ChannelMask(self.0 | channel.mask().0)
    }

    /// Iterate over the channels in the mask, left first.
    pub fn iter(self) -> impl Iterator<Item = Channel> {
        Channel::ALL.into_iter().filter(move |&ch| self.contains(ch))
    }
}

/// Identity of the hardware timer that paces playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId {
    pub group: u8,
    pub index: u8,
}

impl TimerId {
    pub const fn new(group: u8, index: u8) -> Self {
        TimerId { group, index }
    }

    /// Whether the timer exists on the target.
    pub const fn is_valid(self) -> bool {
        self.group < TIMER_GROUPS && self.index < TIMERS_PER_GROUP
    }
}

/// Fixed wiring of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Timer driving the per-sample interrupt.
    pub timer: TimerId,
    /// Bits of duty precision understood by the actuator (8..=10).
    pub duty_resolution: u8,
    /// Clock feeding the PWM peripheral, used to derive the carrier.
    pub pwm_source_clock_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timer: TimerId::default(),
            duty_resolution: DUTY_RESOLUTION_MAX,
            pwm_source_clock_hz: DEFAULT_PWM_SOURCE_CLOCK_HZ,
        }
    }
}

impl Config {
    /// Fixed PWM carrier frequency for this resolution.
    ///
    /// The source clock divided by the duty period, rounded down to a whole
    /// multiple of 1 kHz.
    pub const fn carrier_frequency(&self) -> u32 {
        let freq = self.pwm_source_clock_hz >> self.duty_resolution;
        freq - freq % 1000
    }
}

/// PCM stream parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Params {
    /// Playback rate in Hz.
    pub sample_rate: u32,
    /// Width of one signed source sample: 8, 16 or 32.
    pub bits: u8,
    /// Channels interleaved in the source: 1 or 2.
    pub channels: u8,
}

impl Params {
    /// Parameters applied when a session is created.
    pub const DEFAULT: Params = Params {
        sample_rate: DEFAULT_SAMPLE_RATE,
        bits: DEFAULT_BITS_PER_SAMPLE,
        channels: DEFAULT_CHANNELS,
    };

    /// Size in bytes of one interleaved source frame.
    pub const fn frame_bytes(&self) -> usize {
        self.channels as usize * (self.bits as usize / 8)
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::DEFAULT
    }
}

pub const fn valid_sample_rate(rate: u32) -> bool {
    rate >= SAMPLE_RATE_MIN && rate <= SAMPLE_RATE_MAX
}

pub const fn valid_bits(bits: u8) -> bool {
    matches!(bits, 8 | 16 | 32)
}

pub const fn valid_channels(channels: u8) -> bool {
    matches!(channels, 1 | 2)
}

pub const fn valid_duty_resolution(bits: u8) -> bool {
    bits >= DUTY_RESOLUTION_MIN && bits <= DUTY_RESOLUTION_MAX
}
