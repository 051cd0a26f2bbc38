//! # pwm-audio
//!
//! A `no_std`, zero-allocation engine that streams PCM audio to one or two
//! PWM outputs from a sample-rate timer interrupt, for microcontrollers that
//! drive a speaker with nothing but a duty cycle.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Shared state | [`stream`] | Ring buffer, wake signal and run state in one `static` |
//! | Streaming | [`io`] | SPSC ring, backpressure, PCM conversion, interrupt consumer |
//! | Control | [`session`] | Validation, state machine and blocking `write` |
//! | Hardware | [`hal`] | `HardwareTimer` / `DutyActuator` traits, `embedded-hal` PWM adapter |
//! | Config | [`config`] / [`constants`] | Wiring, stream parameters and limits |
//!
//! ## Quick start
//!
//! ```ignore
//! use pwm_audio::{Config, Error, PwmChannels, Session, Stream, Timeout};
//!
//! static STREAM: Stream<4096> = Stream::new();
//!
//! let config = Config::default();
//! let pwm = PwmChannels::new(Some(left_pwm), Some(right_pwm), &config)
//!     .ok_or(Error::InvalidArgument)?;
//! let (mut session, mut engine) = Session::init(&STREAM, config, timer, delay, pwm)?;
//! session.set_param(16_000, 16, 1)?;
//! session.start()?;
//!
//! // Timer interrupt, once per sample:
//! engine.on_timer();
//!
//! // Writer task:
//! session.write(&pcm, Timeout::millis(50))?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `defmt` | no | Logging through `defmt`, `defmt::Format` on public types |
//! | `log` | no | Logging through the `log` facade |
//!
//! ## Limits
//!
//! - **Sample rate:** 8–48 kHz
//! - **Source format:** signed little-endian 8/16/32-bit, mono or stereo
//! - **Duty resolution:** 8–10 bits
//! - **Ring buffer:** at least [`constants::RING_MIN_SIZE`] bytes

#![no_std]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to later modules.
mod fmt;

pub mod config;
pub mod constants;
pub mod error;
pub mod hal;
pub mod io;
pub mod session;
pub mod stream;

#[cfg(test)]
mod testing;

pub use config::{Channel, ChannelMask, Config, Params, TimerId};
pub use error::Error;
pub use hal::{DutyActuator, HardwareTimer, PwmChannels};
pub use io::{PlaybackEngine, Timeout};
pub use session::{Parts, Session};
pub use stream::{State, Stream};
