/// Free-space hysteresis, in bytes, before the interrupt wakes a blocked writer.
pub const BUFFER_MIN_SIZE: usize = 256;

/// Smallest ring buffer a session accepts (four wake thresholds).
pub const RING_MIN_SIZE: usize = BUFFER_MIN_SIZE << 2;

/// Lowest supported sample rate in Hz.
pub const SAMPLE_RATE_MIN: u32 = 8_000;

/// Highest supported sample rate in Hz.
pub const SAMPLE_RATE_MAX: u32 = 48_000;

/// Narrowest duty resolution, in bits, the converter can target.
pub const DUTY_RESOLUTION_MIN: u8 = 8;

/// Widest duty resolution, in bits, the converter can target.
pub const DUTY_RESOLUTION_MAX: u8 = 10;

/// Number of hardware timer groups a [`TimerId`](crate::config::TimerId) may name.
pub const TIMER_GROUPS: u8 = 2;

/// Number of timers in each group.
pub const TIMERS_PER_GROUP: u8 = 2;

/// Prescaler applied to the timer base clock before the alarm compare.
pub const TIMER_DIVIDER: u32 = 16;

/// Sample rate applied by `init`.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Source sample width applied by `init`.
pub const DEFAULT_BITS_PER_SAMPLE: u8 = 8;

/// Source channel count applied by `init`.
pub const DEFAULT_CHANNELS: u8 = 2;

/// Default clock feeding the PWM peripheral (80 MHz APB).
pub const DEFAULT_PWM_SOURCE_CLOCK_HZ: u32 = 80_000_000;
