//! Hardware collaborators consumed by the station.
//!
//! The traits mirror the capabilities of the field hardware (INA226 power
//! meter, QMC5883 compass, relay on a GPIO line, Pi camera, DS3231 RTC).
//! Real I2C drivers plug in behind them; this crate ships simulated devices
//! and an external-command camera.

pub mod camera;
pub mod clock;
pub mod sim;
pub mod worker;

pub use camera::CommandCamera;
pub use clock::{BoundedClock, SystemClock};
pub use worker::DeviceWorker;

use chrono::NaiveDateTime;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Transient device failure. Never fatal: the cycle logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error("{device} did not answer within {after:?}")]
    Timeout { device: &'static str, after: Duration },

    #[error("{0} is still busy with an earlier request")]
    Busy(&'static str),

    #[error("{0} worker is gone")]
    Disconnected(&'static str),

    #[error("{device}: {message}")]
    Device {
        device: &'static str,
        message: String,
    },
}

impl SensorError {
    pub fn device(device: &'static str, message: impl Into<String>) -> Self {
        SensorError::Device {
            device,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClockError {
    #[error("clock read failed: {0}")]
    Read(String),

    #[error("clock did not answer within {0:?}")]
    Timeout(Duration),
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Result<NaiveDateTime, ClockError>;
}

pub trait PowerMeter: Send {
    /// Leave low-power mode so a fresh conversion starts.
    fn wake(&mut self) -> Result<(), SensorError>;
    fn configure(&mut self) -> Result<(), SensorError>;
    fn set_low_battery_threshold(&mut self, volts: f64) -> Result<(), SensorError>;
    fn conversion_ready(&mut self) -> Result<bool, SensorError>;
    /// Amps.
    fn read_current(&mut self) -> Result<f64, SensorError>;
    /// Volts.
    fn read_voltage(&mut self) -> Result<f64, SensorError>;
}

/// Status register of the magnetometer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MagStatus {
    pub ready: bool,
    pub overflow: bool,
    pub skipped: bool,
}

pub trait Magnetometer: Send {
    fn status(&mut self) -> Result<MagStatus, SensorError>;
    /// Rotated heading in degrees, before declination correction.
    fn heading(&mut self) -> Result<f64, SensorError>;
    fn temperature(&mut self) -> Result<f64, SensorError>;
}

pub trait Camera: Send {
    fn capture(&mut self, path: &Path) -> Result<(), SensorError>;
}

/// Relay selecting which electrical quantity the meter sees.
pub trait PowerPhaseSwitch: Send {
    fn on(&mut self) -> Result<(), SensorError>;
    fn off(&mut self) -> Result<(), SensorError>;
}

/// The hardware handed to a `Station` at startup.
pub struct Devices {
    pub meter: Box<dyn PowerMeter>,
    pub compass: Box<dyn Magnetometer>,
    pub camera: Box<dyn Camera>,
    pub relay: Box<dyn PowerPhaseSwitch>,
}
