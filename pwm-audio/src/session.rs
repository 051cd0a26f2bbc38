//! Writer-side control of a PWM audio stream.
//!
//! A [`Session`] validates the configuration, owns the timer, converts PCM
//! into the ring and walks the state machine:
//!
//! ```text
//!              init                start
//! Uninitialized ────► Idle ◄──────────────► Busy
//!       ▲              │        stop
//!       └──── deinit ──┘  (deinit from Busy stops first)
//! ```
//!
//! [`init()`](Session::init) also returns the [`PlaybackEngine`], which
//! belongs in the timer interrupt.
//!
//! # Example
//!
//! ```ignore
//! static STREAM: Stream<4096> = Stream::new();
//!
//! let (mut session, engine) =
//!     Session::init(&STREAM, Config::default(), timer, delay, pwm)?;
//! session.set_param(22_050, 16, 1)?;
//! session.start()?;
//!
//! // writer task
//! let mut pos = 0;
//! while pos < pcm.len() {
//!     match session.write(&pcm[pos..], Timeout::millis(100)) {
//!         Ok(n) => pos += n,
//!         Err(Error::Timeout { written }) => pos += written,
//!         Err(e) => return Err(e),
//!     }
//! }
//! ```

use embedded_hal::delay::DelayNs;

use crate::config::{
    valid_bits, valid_channels, valid_duty_resolution, valid_sample_rate, ChannelMask, Config,
    Params,
};
use crate::constants::RING_MIN_SIZE;
use crate::error::Error;
use crate::hal::{DutyActuator, HardwareTimer};
use crate::io::backpressure::Timeout;
use crate::io::convert::{sample_width, SampleConverter, MAX_FRAME_BYTES};
use crate::io::playback::PlaybackEngine;
use crate::stream::{Layout, State, Stream, StreamClaim};

/// Collaborators handed back by [`Session::deinit`].
pub struct Parts<T, D, A> {
    pub timer: T,
    pub delay: D,
    pub actuator: A,
}

/// Writer-side handle of a claimed [`Stream`].
///
/// Generic over the [`HardwareTimer`] and over the [`DelayNs`] provider used
/// while waiting for ring space. Configuration calls assume a single
/// configuring task; the only guard is the `Busy` state check.
///
/// Dropping a session without [`deinit()`](Self::deinit) still releases the
/// stream: queued audio is discarded, the [`PlaybackEngine`] goes quiet and
/// a later [`init()`](Self::init) can claim the stream again. The timer is
/// dropped as it is, so prefer `deinit` to get it back paused.
pub struct Session<'a, T, D, const N: usize> {
    stream: &'a Stream<N>,
    _claim: StreamClaim<'a, N>,
    timer: T,
    delay: D,
    config: Config,
    mask: ChannelMask,
    params: Params,
}

impl<'a, T, D, const N: usize> Session<'a, T, D, N>
where
    T: HardwareTimer,
    D: DelayNs,
{
    /// Validate `config`, claim `stream` and apply the default parameters
    /// (16 kHz, 8-bit, stereo).
    ///
    /// The outputs to drive are taken from `actuator.channels()`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: timer identity or duty resolution out of range,
    ///   or the actuator drives no channel.
    /// - `ResourceExhausted`: `N` is below [`RING_MIN_SIZE`].
    /// - `InvalidState`: another session holds `stream`.
    /// - `Timer`: programming the default period failed.
    pub fn init<A>(
        stream: &'a Stream<N>,
        config: Config,
        timer: T,
        delay: D,
        actuator: A,
    ) -> Result<(Self, PlaybackEngine<'a, A, N>), Error<T::Error>>
    where
        A: DutyActuator,
    {
        if !config.timer.is_valid() {
            error!(
                "invalid timer group {} index {}",
                config.timer.group,
                config.timer.index
            );
            return Err(Error::InvalidArgument);
        }
        if !valid_duty_resolution(config.duty_resolution) {
            error!("invalid duty resolution {}", config.duty_resolution);
            return Err(Error::InvalidArgument);
        }
        let mask = actuator.channels();
        if mask.is_empty() {
            error!("no output channel wired");
            return Err(Error::InvalidArgument);
        }
        if N < RING_MIN_SIZE {
            error!("ring buffer of {} bytes, minimum {}", N, RING_MIN_SIZE);
            return Err(Error::ResourceExhausted);
        }
        let Some(claim) = stream.claim() else {
            error!("stream already in use");
            return Err(Error::InvalidState);
        };

        let mut session = Session {
            stream,
            _claim: claim,
            timer,
            delay,
            config,
            mask,
            params: Params::DEFAULT,
        };

        // On failure the dropped session hands the stream back.
        let Params { sample_rate, bits, channels } = Params::DEFAULT;
        session.set_param(sample_rate, bits, channels)?;

        debug!(
            "pwm audio ready: {}-bit duty, carrier {} Hz, mask {}",
            config.duty_resolution,
            config.carrier_frequency(),
            mask.bits()
        );
        Ok((session, PlaybackEngine::new(stream, actuator)))
    }

    /// Set rate, source width and source channel count.
    ///
    /// Reprograms the timer period. Rejected with `InvalidState` while
    /// playing, leaving the current parameters untouched.
    ///
    /// Audio queued while idle is kept unless the channel count changes, in
    /// which case it is discarded: the ring holds whole frames of the old
    /// layout and would be read out of phase.
    pub fn set_param(&mut self, sample_rate: u32, bits: u8, channels: u8) -> Result<(), Error<T::Error>> {
        self.ensure_idle()?;
        if !valid_sample_rate(sample_rate) {
            error!("invalid sample rate {}", sample_rate);
            return Err(Error::InvalidArgument);
        }
        if !valid_bits(bits) {
            error!("invalid bits per sample {}", bits);
            return Err(Error::InvalidArgument);
        }
        if !valid_channels(channels) {
            error!("invalid channel count {}", channels);
            return Err(Error::InvalidArgument);
        }

        self.timer.set_period(sample_rate).map_err(Error::Timer)?;
        if channels != self.params.channels && !self.stream.ring().is_empty() {
            debug!("channel count changed, dropping {} queued bytes", self.stream.ring().count());
            self.stream.ring().flush();
            self.stream.signal().reset();
        }
        self.params = Params { sample_rate, bits, channels };
        self.stream.set_layout(Layout {
            channels,
            slot_width: sample_width(self.config.duty_resolution) as u8,
            mask: self.mask,
        });

        debug!("params: {} Hz, {} bits, {} channels", sample_rate, bits, channels);
        Ok(())
    }

    /// Change only the sample rate. Rejected with `InvalidState` while
    /// playing.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), Error<T::Error>> {
        self.ensure_idle()?;
        if !valid_sample_rate(sample_rate) {
            error!("invalid sample rate {}", sample_rate);
            return Err(Error::InvalidArgument);
        }

        self.timer.set_period(sample_rate).map_err(Error::Timer)?;
        self.params.sample_rate = sample_rate;
        debug!("sample rate: {} Hz", sample_rate);
        Ok(())
    }

    /// Enable the sample interrupt and start playing.
    ///
    /// Only legal from `Idle`; a second `start` returns `InvalidState`.
    pub fn start(&mut self) -> Result<(), Error<T::Error>> {
        if self.stream.state() != State::Idle {
            error!("start while not idle");
            return Err(Error::InvalidState);
        }

        self.stream.set_state(State::Busy);
        self.timer.enable_interrupt();
        if let Err(e) = self.timer.start() {
            self.timer.disable_interrupt();
            self.stream.set_state(State::Idle);
            return Err(Error::Timer(e));
        }

        debug!("playback started");
        Ok(())
    }

    /// Stop the interrupt and drop any queued audio.
    ///
    /// Flushing avoids replaying stale samples on the next `start`. Calling
    /// `stop` while idle is allowed and still flushes. The session is `Idle`
    /// afterwards even if the timer reports an error.
    ///
    /// The flush relies on [`HardwareTimer::disable_interrupt`] not returning
    /// while a handler is still inside [`PlaybackEngine::on_timer`]. On a
    /// single core this always holds; with the handler on another core the
    /// timer implementation must wait for it.
    pub fn stop(&mut self) -> Result<(), Error<T::Error>> {
        let paused = self.timer.pause();
        self.timer.disable_interrupt();
        self.stream.set_state(State::Idle);
        self.stream.ring().flush();
        self.stream.signal().reset();

        debug!("playback stopped");
        paused.map_err(Error::Timer)
    }

    /// Stop playback, release the outputs and hand the stream back.
    ///
    /// `engine` must be the one returned by [`init()`](Self::init). Teardown
    /// always completes; a timer error while stopping is logged and ignored.
    pub fn deinit<A>(mut self, engine: PlaybackEngine<'a, A, N>) -> Parts<T, D, A>
    where
        A: DutyActuator,
    {
        debug_assert!(engine.is_bound_to(self.stream), "engine belongs to another stream");

        if self.stop().is_err() {
            warn!("timer failed to pause during deinit");
        }

        let mut actuator = engine.into_actuator();
        for channel in self.mask.iter() {
            actuator.release(channel);
        }

        debug!("pwm audio released");
        // `_claim` drops here and releases the stream.
        Parts {
            timer: self.timer,
            delay: self.delay,
            actuator,
        }
    }

    /// Convert `pcm` into the ring, blocking while it is full.
    ///
    /// `pcm` holds interleaved signed little-endian samples in the current
    /// [`Params`]. Legal while idle (pre-buffering) and while playing.
    /// `timeout` bounds each wait for the interrupt to free space.
    ///
    /// # Lossy tail
    ///
    /// Input is converted in whole frames. A trailing remainder shorter than
    /// one frame is discarded but still counted as consumed, so a successful
    /// write always returns `pcm.len()`. Callers that split frames across
    /// writes lose the split frame.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: `pcm` is empty.
    /// - `Timeout { written }`: the ring stayed full past `timeout`.
    ///   `written` whole-frame bytes were consumed; resume from there.
    pub fn write(&mut self, pcm: &[u8], timeout: Timeout) -> Result<usize, Error<T::Error>> {
        if pcm.is_empty() {
            error!("empty write");
            return Err(Error::InvalidArgument);
        }

        let stream = self.stream;
        let ring = stream.ring();
        let converter = SampleConverter::new(&self.params, self.config.duty_resolution);
        let frames = pcm.chunks_exact(converter.frame_in());
        let tail = frames.remainder().len();

        let mut written = 0;
        let mut out = [0u8; MAX_FRAME_BYTES];
        for frame in frames {
            let n = converter.encode_frame(frame, &mut out);
            while !ring.write_slice(&out[..n]) {
                if !stream.signal().arm_and_wait(timeout, &mut self.delay) {
                    trace!("write timed out after {} bytes", written);
                    return Err(Error::Timeout { written });
                }
            }
            written += frame.len();
        }

        if tail != 0 {
            trace!("discarded {} trailing bytes", tail);
        }
        Ok(written + tail)
    }

    /// Current run state of the stream.
    pub fn status(&self) -> State {
        self.stream.state()
    }

    /// Parameters of the PCM accepted by [`write()`](Self::write).
    pub fn params(&self) -> Params {
        self.params
    }

    /// Configuration given to [`init()`](Self::init).
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Outputs being driven.
    pub fn channel_mask(&self) -> ChannelMask {
        self.mask
    }

    /// PWM carrier frequency implied by the configuration.
    pub fn carrier_frequency(&self) -> u32 {
        self.config.carrier_frequency()
    }

    /// The claimed stream.
    pub fn stream(&self) -> &'a Stream<N> {
        self.stream
    }

    /// The timer pacing playback.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn ensure_idle(&self) -> Result<(), Error<T::Error>> {
        if self.stream.state() == State::Busy {
            error!("parameters are locked while playing");
            return Err(Error::InvalidState);
        }
        Ok(())
    }
}
