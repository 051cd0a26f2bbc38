//! Integration tests exercising the full write → ring → interrupt pipeline.
//!
//! The hardware timer is simulated either by calling
//! [`PlaybackEngine::on_timer()`] inline or by a thread that ticks it at a
//! fixed interval while the writer blocks on backpressure:
//!
//! ```text
//! Session::write → SampleConverter → RingBuffer → PlaybackEngine → RecordingActuator
//! ```

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use std::vec::Vec;

    use crate::config::{Channel, ChannelMask, Config};
    use crate::error::Error;
    use crate::io::backpressure::Timeout;
    use crate::io::playback::PlaybackEngine;
    use crate::session::Session;
    use crate::stream::Stream;
    use crate::testing::{CountingDelay, MockTimer, RecordingActuator, StdDelay};

    fn config(duty_resolution: u8) -> Config {
        Config { duty_resolution, ..Config::default() }
    }

    fn pcm16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Tick the engine until the ring is empty.
    fn drain<const N: usize>(engine: &mut PlaybackEngine<'_, RecordingActuator, N>, stream: &Stream<N>) {
        while !stream.ring().is_empty() {
            engine.on_timer();
        }
    }

    // ---------------------------------------------------------------
    // Round trip: 16-bit ramp to 10-bit duty
    // ---------------------------------------------------------------
    #[test]
    fn sixteen_bit_ramp_reaches_actuator_exactly() {
        let stream: Stream<4096> = Stream::new();
        let (mut session, mut engine) = Session::init(
            &stream,
            config(10),
            MockTimer::default(),
            CountingDelay::default(),
            RecordingActuator::new(ChannelMask::LEFT),
        )
        .unwrap();
        session.set_param(16_000, 16, 1).unwrap();
        session.start().unwrap();

        let ramp: Vec<i16> = (0..=256)
            .map(|i| (-32768i32 + i * 256).min(32767) as i16)
            .collect();
        let pcm = pcm16(&ramp);

        let mut pos = 0;
        while pos < pcm.len() {
            let chunk = &pcm[pos..(pos + 256).min(pcm.len())];
            pos += session.write(chunk, Timeout::NoWait).unwrap();
            drain(&mut engine, &stream);
        }

        let expected: Vec<u16> = ramp
            .iter()
            .map(|&s| ((s as i32 + 32767).max(0) >> 6) as u16)
            .collect();
        assert_eq!(engine.actuator().values(Channel::Left), expected);
        assert_eq!(expected[0], 0);
        assert_eq!(*expected.last().unwrap(), 1023);
    }

    // ---------------------------------------------------------------
    // 8-bit source with a 10-bit actuator: two-byte slots on both sides
    // ---------------------------------------------------------------
    #[test]
    fn eight_bit_source_on_wide_duty_stays_aligned() {
        let stream: Stream<1024> = Stream::new();
        let (mut session, mut engine) = Session::init(
            &stream,
            config(10),
            MockTimer::default(),
            CountingDelay::default(),
            RecordingActuator::new(ChannelMask::BOTH),
        )
        .unwrap();
        session.set_param(8_000, 8, 2).unwrap();
        session.start().unwrap();

        // L, R pairs
        let pcm: [u8; 6] = [0x00, 0x7F, 0x81, 0x10, 0xFF, 0x01];
        assert_eq!(session.write(&pcm, Timeout::NoWait), Ok(6));
        assert_eq!(stream.ring().count(), 12);

        drain(&mut engine, &stream);
        let act = engine.actuator();
        assert_eq!(act.values(Channel::Left), [127 << 2, 0, 126 << 2]);
        assert_eq!(act.values(Channel::Right), [254 << 2, 143 << 2, 128 << 2]);
    }

    // ---------------------------------------------------------------
    // Mono source, both outputs wired: right mirrors left every period
    // ---------------------------------------------------------------
    #[test]
    fn mono_source_mirrors_to_both_outputs() {
        let stream: Stream<1024> = Stream::new();
        let (mut session, mut engine) = Session::init(
            &stream,
            config(9),
            MockTimer::default(),
            CountingDelay::default(),
            RecordingActuator::new(ChannelMask::BOTH),
        )
        .unwrap();
        session.set_param(22_050, 16, 1).unwrap();
        session.start().unwrap();

        let samples: Vec<i16> = (0..100).map(|i| (i * 617 - 30_000) as i16).collect();
        session.write(&pcm16(&samples), Timeout::NoWait).unwrap();

        while !stream.ring().is_empty() {
            engine.on_timer();
            assert_eq!(engine.last_duty(Channel::Left), engine.last_duty(Channel::Right));
        }
        assert_eq!(engine.actuator().values(Channel::Right).len(), 100);
    }

    // ---------------------------------------------------------------
    // Stop discards queued audio, restart plays only new audio
    // ---------------------------------------------------------------
    #[test]
    fn restart_after_stop_plays_fresh_audio() {
        let stream: Stream<1024> = Stream::new();
        let (mut session, mut engine) = Session::init(
            &stream,
            config(8),
            MockTimer::default(),
            CountingDelay::default(),
            RecordingActuator::new(ChannelMask::LEFT),
        )
        .unwrap();
        session.set_param(16_000, 8, 1).unwrap();

        session.write(&[10; 50], Timeout::NoWait).unwrap();
        session.start().unwrap();
        engine.on_timer();
        session.stop().unwrap();
        assert_eq!(stream.ring().count(), 0);

        // Interrupt firing late after stop does nothing.
        engine.on_timer();

        session.write(&[20; 3], Timeout::NoWait).unwrap();
        session.start().unwrap();
        drain(&mut engine, &stream);

        assert_eq!(engine.actuator().values(Channel::Left), [137, 147, 147, 147]);
    }

    // ---------------------------------------------------------------
    // Switching mono to stereo while idle keeps left and right in place
    // ---------------------------------------------------------------
    #[test]
    fn mono_to_stereo_switch_keeps_channels_aligned() {
        let stream: Stream<1024> = Stream::new();
        let (mut session, mut engine) = Session::init(
            &stream,
            config(8),
            MockTimer::default(),
            CountingDelay::default(),
            RecordingActuator::new(ChannelMask::BOTH),
        )
        .unwrap();

        session.set_param(16_000, 8, 1).unwrap();
        session.write(&[0], Timeout::NoWait).unwrap();

        session.set_param(16_000, 8, 2).unwrap();
        // -117 + 127 = 10 on the left, -107 + 127 = 20 on the right.
        let frame = [(-117i8) as u8, (-107i8) as u8];
        let pcm: Vec<u8> = frame.iter().copied().cycle().take(6).collect();
        session.write(&pcm, Timeout::NoWait).unwrap();

        session.start().unwrap();
        for _ in 0..4 {
            engine.on_timer();
        }

        assert_eq!(engine.actuator().values(Channel::Left), [10, 10, 10]);
        assert_eq!(engine.actuator().values(Channel::Right), [20, 20, 20]);
    }

    // ---------------------------------------------------------------
    // Writer blocked on a full ring is released by the interrupt
    // ---------------------------------------------------------------
    #[test]
    fn blocked_writer_completes_with_running_engine() {
        let stream: Stream<1024> = Stream::new();
        let (mut session, engine) = Session::init(
            &stream,
            config(10),
            MockTimer::default(),
            StdDelay,
            RecordingActuator::new(ChannelMask::BOTH),
        )
        .unwrap();
        session.set_param(48_000, 16, 2).unwrap();
        session.start().unwrap();

        // Several ring-fulls of distinct stereo frames.
        let frames = 2_000;
        let samples: Vec<i16> = (0..frames * 2).map(|i| (i * 7) as i16).collect();
        let pcm = pcm16(&samples);

        let done = AtomicBool::new(false);
        let wakes = AtomicUsize::new(0);

        let engine = thread::scope(|s| {
            let isr = s.spawn(|| {
                let mut engine = engine;
                loop {
                    if engine.on_timer() {
                        wakes.fetch_add(1, Ordering::Relaxed);
                    }
                    if done.load(Ordering::Acquire) && stream.ring().is_empty() {
                        break;
                    }
                    thread::sleep(Duration::from_micros(10));
                }
                engine
            });

            assert_eq!(session.write(&pcm, Timeout::Forever), Ok(pcm.len()));
            done.store(true, Ordering::Release);
            isr.join().unwrap()
        });

        let left = engine.actuator().values(Channel::Left);
        let right = engine.actuator().values(Channel::Right);
        let expected_left: Vec<u16> = samples
            .iter()
            .step_by(2)
            .map(|&s| ((s as i32 + 32767) >> 6) as u16)
            .collect();
        let expected_right: Vec<u16> = samples
            .iter()
            .skip(1)
            .step_by(2)
            .map(|&s| ((s as i32 + 32767) >> 6) as u16)
            .collect();
        assert_eq!(left, expected_left);
        assert_eq!(right, expected_right);
        assert!(wakes.load(Ordering::Relaxed) >= 1);
    }

    // ---------------------------------------------------------------
    // A timed-out write can be resumed without loss or duplication
    // ---------------------------------------------------------------
    #[test]
    fn timed_out_write_resumes_at_reported_offset() {
        let stream: Stream<1024> = Stream::new();
        let (mut session, mut engine) = Session::init(
            &stream,
            config(8),
            MockTimer::default(),
            CountingDelay::default(),
            RecordingActuator::new(ChannelMask::LEFT),
        )
        .unwrap();
        session.set_param(8_000, 8, 1).unwrap();

        let pcm: Vec<u8> = (0..1500u32).map(|i| (i % 100) as u8).collect();

        // Idle: nothing drains, so the first write stops at ring capacity.
        let written = match session.write(&pcm, Timeout::Micros(200)) {
            Err(Error::Timeout { written }) => written,
            other => panic!("expected timeout, got {other:?}"),
        };
        assert_eq!(written, 1023);

        session.start().unwrap();
        drain(&mut engine, &stream);
        assert_eq!(session.write(&pcm[written..], Timeout::NoWait), Ok(pcm.len() - written));
        drain(&mut engine, &stream);

        let expected: Vec<u16> = pcm.iter().map(|&b| (b as i8 as i16 + 127).max(0) as u16).collect();
        assert_eq!(engine.actuator().values(Channel::Left), expected);
    }
}
