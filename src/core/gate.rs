use crate::errors::{AppError, AppResult};
use std::fmt;

/// Daily hour range during which acquisition runs. Both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    start_hour: u32,
    stop_hour: u32,
}

impl OperatingWindow {
    pub fn new(start_hour: u32, stop_hour: u32) -> AppResult<Self> {
        if start_hour > 23 || stop_hour > 23 {
            return Err(AppError::Config(format!(
                "operating window hours must be within 0..=23 (got {start_hour}..={stop_hour})"
            )));
        }
        if start_hour > stop_hour {
            return Err(AppError::Config(format!(
                "operating window start ({start_hour}) is after stop ({stop_hour})"
            )));
        }
        Ok(Self {
            start_hour,
            stop_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn stop_hour(&self) -> u32 {
        self.stop_hour
    }

    pub fn allows(&self, hour: u32) -> bool {
        allowed(hour, self)
    }
}

impl fmt::Display for OperatingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:59", self.start_hour, self.stop_hour)
    }
}

pub fn allowed(hour: u32, window: &OperatingWindow) -> bool {
    window.start_hour <= hour && hour <= window.stop_hour
}

/// Rate limiter for the "waiting for the window" notice.
///
/// Logs on the first closed poll, then once every `every` polls, and starts
/// over as soon as the window opens again.
#[derive(Debug, Clone)]
pub struct WaitNotice {
    every: u32,
    polls: u32,
}

impl WaitNotice {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            polls: 0,
        }
    }

    /// Register one closed poll; true when this poll should be logged.
    pub fn closed_poll(&mut self) -> bool {
        let log_now = self.polls % self.every == 0;
        self.polls = self.polls.wrapping_add(1);
        log_now
    }

    pub fn reset(&mut self) {
        self.polls = 0;
    }
}
