use super::{Clock, ClockError, DeviceWorker, SensorError};
use chrono::{Local, NaiveDateTime};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Host wall clock in local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        Ok(Local::now().naive_local())
    }
}

/// Wraps a clock (typically an RTC on I2C) so that reads cannot hang.
pub struct BoundedClock {
    worker: DeviceWorker<Arc<dyn Clock>>,
}

impl BoundedClock {
    pub fn spawn(inner: Arc<dyn Clock>, timeout: Duration) -> io::Result<Self> {
        Ok(Self {
            worker: DeviceWorker::spawn("clock", inner, timeout)?,
        })
    }
}

impl Clock for BoundedClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        match self.worker.call(|clock| Ok(clock.now())) {
            Ok(read) => read,
            Err(SensorError::Timeout { after, .. }) => Err(ClockError::Timeout(after)),
            Err(other) => Err(ClockError::Read(other.to_string())),
        }
    }
}
