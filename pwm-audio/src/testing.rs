//! Test doubles for the timer, actuator and delay collaborators.

use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::config::{Channel, ChannelMask};
use crate::hal::{DutyActuator, HardwareTimer};

/// Actuator that records every duty update.
pub struct RecordingActuator {
    pub mask: ChannelMask,
    pub log: Vec<(Channel, u16)>,
    pub released: Vec<Channel>,
}

impl RecordingActuator {
    pub fn new(mask: ChannelMask) -> Self {
        RecordingActuator {
            mask,
            log: Vec::new(),
            released: Vec::new(),
        }
    }

    /// Duty values sent to one channel, in order.
    pub fn values(&self, channel: Channel) -> Vec<u16> {
        self.log
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .map(|&(_, v)| v)
            .collect()
    }
}

impl DutyActuator for RecordingActuator {
    fn channels(&self) -> ChannelMask {
        self.mask
    }

    fn set_duty(&mut self, channel: Channel, value: u16) {
        self.log.push((channel, value));
    }

    fn release(&mut self, channel: Channel) {
        self.released.push(channel);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockTimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCall {
    SetPeriod(u32),
    Start,
    Pause,
    EnableInterrupt,
    DisableInterrupt,
}

/// Timer that logs calls and can be told to reject the next one.
#[derive(Default)]
pub struct MockTimer {
    pub calls: Vec<TimerCall>,
    pub period_hz: Option<u32>,
    pub running: bool,
    pub interrupt_enabled: bool,
    pub fail_next: bool,
}

impl MockTimer {
    fn check(&mut self) -> Result<(), MockTimerError> {
        if core::mem::take(&mut self.fail_next) {
            Err(MockTimerError)
        } else {
            Ok(())
        }
    }
}

impl HardwareTimer for MockTimer {
    type Error = MockTimerError;

    fn set_period(&mut self, sample_rate_hz: u32) -> Result<(), Self::Error> {
        self.check()?;
        self.calls.push(TimerCall::SetPeriod(sample_rate_hz));
        self.period_hz = Some(sample_rate_hz);
        Ok(())
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.calls.push(TimerCall::Start);
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.calls.push(TimerCall::Pause);
        self.running = false;
        Ok(())
    }

    fn enable_interrupt(&mut self) {
        self.calls.push(TimerCall::EnableInterrupt);
        self.interrupt_enabled = true;
    }

    fn disable_interrupt(&mut self) {
        self.calls.push(TimerCall::DisableInterrupt);
        self.interrupt_enabled = false;
    }
}

/// Delay that returns immediately and adds up the time it was asked for.
#[derive(Default)]
pub struct CountingDelay {
    pub total_us: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_us += (ns / 1000) as u64;
    }

    fn delay_us(&mut self, us: u32) {
        self.total_us += us as u64;
    }
}

/// Delay backed by `std::thread::sleep`.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}
