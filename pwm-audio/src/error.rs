//! Errors reported by the control and write APIs.

use core::fmt;

/// Error returned by [`Session`](crate::session::Session) operations.
///
/// `E` is the error type of the [`HardwareTimer`](crate::hal::HardwareTimer)
/// collaborator. Interrupt-context code never produces an `Error`; buffer
/// underrun is absorbed by repeating the previous duty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A rate, sample width, channel count, resolution, timer identity or
    /// buffer was out of range.
    InvalidArgument,
    /// The operation is not legal in the current [`State`](crate::stream::State).
    InvalidState,
    /// The stream's ring buffer is smaller than
    /// [`RING_MIN_SIZE`](crate::constants::RING_MIN_SIZE).
    ResourceExhausted,
    /// A write blocked past its deadline.
    ///
    /// `written` counts the input bytes consumed before the deadline; the
    /// caller resumes from that offset.
    Timeout { written: usize },
    /// The hardware timer rejected a request.
    Timer(E),
}

impl<E> Error<E> {
    /// Bytes consumed before the failure, if the error came from a write.
    pub fn written(&self) -> Option<usize> {
        match *self {
            Error::Timeout { written } => Some(written),
            _ => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::InvalidState => f.write_str("operation not allowed in current state"),
            Error::ResourceExhausted => f.write_str("ring buffer below minimum size"),
            Error::Timeout { written } => {
                write!(f, "write timed out after {written} bytes")
            }
            Error::Timer(e) => write!(f, "hardware timer error: {e:?}"),
        }
    }
}
