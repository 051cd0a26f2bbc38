//! Real-time streaming path between the writer task and the sample interrupt.
//!
//! ## Components
//!
//! | Item | Context | Description |
//! |------|---------|-------------|
//! | [`RingBuffer`] | both | Lock-free SPSC byte ring |
//! | [`BackpressureSignal`] | both | One-shot wake from interrupt to writer |
//! | [`SampleConverter`] | writer | PCM frame → duty slots |
//! | [`PlaybackEngine`] | interrupt | Duty slots → PWM outputs |
//!
//! ## Data flow
//!
//! ```text
//!  Session::write ──convert──► RingBuffer ──on_timer──► DutyActuator
//!        ▲                                   │
//!        └───────── BackpressureSignal ◄─────┘  (free > BUFFER_MIN_SIZE)
//! ```

pub mod backpressure;
pub mod convert;
pub mod playback;
pub mod ring;

pub use backpressure::{BackpressureSignal, Timeout};
pub use convert::SampleConverter;
pub use playback::PlaybackEngine;
pub use ring::RingBuffer;

#[cfg(test)]
mod integration_tests;
