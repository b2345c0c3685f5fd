// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("No timestamp device available")]
    NoTimestampDevice,
}

/// Time source for the firmware: a cycle timestamp for measurements and a
/// blocking delay for pacing the command loop.
pub trait Clock {
    /// Start the timestamp timer. Fails when the board has none.
    fn start_timestamp(&mut self) -> Result<(), ClockError>;

    /// Cycles since the timestamp was started, or `None` without a timer.
    fn timestamp(&mut self) -> Option<u64>;

    /// Block for `duration`, returning the number of clock cycles that
    /// elapsed.
    fn sleep(&mut self, duration: Duration) -> u64;

    fn frequency(&self) -> u64;
}

fn duration_to_cycles(duration: Duration, hz: u64) -> u64 {
    (duration.as_nanos() * hz as u128 / 1_000_000_000) as u64
}

/// Wall-clock time scaled to the board clock.
#[derive(Debug)]
pub struct HostClock {
    hz: u64,
    has_timer: bool,
    started: Option<Instant>,
}

impl HostClock {
    pub fn new(hz: u64, has_timer: bool) -> Self {
        Self {
            hz,
            has_timer,
            started: None,
        }
    }
}

impl Clock for HostClock {
    fn start_timestamp(&mut self) -> Result<(), ClockError> {
        if !self.has_timer {
            return Err(ClockError::NoTimestampDevice);
        }
        self.started = Some(Instant::now());
        Ok(())
    }

    fn timestamp(&mut self) -> Option<u64> {
        self.started
            .map(|start| duration_to_cycles(start.elapsed(), self.hz))
    }

    fn sleep(&mut self, duration: Duration) -> u64 {
        let before = Instant::now();
        std::thread::sleep(duration);
        duration_to_cycles(before.elapsed(), self.hz)
    }

    fn frequency(&self) -> u64 {
        self.hz
    }
}

/// Virtual clock for tests and `--no-delay` runs. Sleeps return immediately
/// and are recorded; every timestamp read costs `cycles_per_read` cycles.
#[derive(Debug, Clone)]
pub struct ManualClock {
    hz: u64,
    has_timer: bool,
    started: bool,
    cycles: u64,
    cycles_per_read: u64,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new(hz: u64) -> Self {
        Self {
            hz,
            has_timer: true,
            started: false,
            cycles: 0,
            cycles_per_read: 1,
            sleeps: Vec::new(),
        }
    }

    pub fn without_timer(mut self) -> Self {
        self.has_timer = false;
        self
    }

    pub fn with_cycles_per_read(mut self, cycles: u64) -> Self {
        self.cycles_per_read = cycles;
        self
    }

    pub fn advance(&mut self, cycles: u64) {
        self.cycles = self.cycles.wrapping_add(cycles);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Clock for ManualClock {
    fn start_timestamp(&mut self) -> Result<(), ClockError> {
        if !self.has_timer {
            return Err(ClockError::NoTimestampDevice);
        }
        self.started = true;
        Ok(())
    }

    fn timestamp(&mut self) -> Option<u64> {
        if !self.started {
            return None;
        }
        let now = self.cycles;
        self.advance(self.cycles_per_read);
        Some(now)
    }

    fn sleep(&mut self, duration: Duration) -> u64 {
        let cycles = duration_to_cycles(duration, self.hz);
        self.sleeps.push(duration);
        self.advance(cycles);
        cycles
    }

    fn frequency(&self) -> u64 {
        self.hz
    }
}
