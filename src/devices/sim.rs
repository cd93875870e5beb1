//! Simulated station hardware, used when no real drivers are wired in.
//!
//! Readings follow the time of day so charts look like a clear-sky day.

use super::{Camera, Clock, MagStatus, Magnetometer, PowerMeter, PowerPhaseSwitch, SensorError};
use crate::utils::time::hours_of_day;
use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

fn daylight(clock: &dyn Clock) -> f64 {
    let hours = clock.now().map(|dt| hours_of_day(dt.time())).unwrap_or(12.0);
    ((hours - 6.0) / 12.0 * PI).sin().max(0.0)
}

pub struct SimPowerMeter {
    clock: Arc<dyn Clock>,
    max_amps: f64,
    awake: bool,
    low_battery: f64,
}

impl SimPowerMeter {
    pub fn new(clock: Arc<dyn Clock>, max_amps: f64) -> Self {
        Self {
            clock,
            max_amps,
            awake: false,
            low_battery: 0.0,
        }
    }
}

impl PowerMeter for SimPowerMeter {
    fn wake(&mut self) -> Result<(), SensorError> {
        self.awake = true;
        Ok(())
    }

    fn configure(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn set_low_battery_threshold(&mut self, volts: f64) -> Result<(), SensorError> {
        self.low_battery = volts;
        Ok(())
    }

    fn conversion_ready(&mut self) -> Result<bool, SensorError> {
        Ok(self.awake)
    }

    fn read_current(&mut self) -> Result<f64, SensorError> {
        Ok(self.max_amps * 0.12 * daylight(self.clock.as_ref()))
    }

    fn read_voltage(&mut self) -> Result<f64, SensorError> {
        let v = 12.0 + 9.0 * daylight(self.clock.as_ref());
        Ok(v.max(self.low_battery))
    }
}

pub struct SimMagnetometer {
    clock: Arc<dyn Clock>,
}

impl SimMagnetometer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Magnetometer for SimMagnetometer {
    fn status(&mut self) -> Result<MagStatus, SensorError> {
        Ok(MagStatus {
            ready: true,
            ..MagStatus::default()
        })
    }

    fn heading(&mut self) -> Result<f64, SensorError> {
        // Station faces a fixed direction; a little wobble from wind.
        let hours = self
            .clock
            .now()
            .map(|dt| hours_of_day(dt.time()))
            .unwrap_or(0.0);
        Ok(180.0 + 2.0 * (hours * 7.0).sin())
    }

    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(18.0 + 14.0 * daylight(self.clock.as_ref()))
    }
}

/// Creates an empty file at the target path so day directories are populated.
#[derive(Debug, Default)]
pub struct SimCamera;

impl Camera for SimCamera {
    fn capture(&mut self, path: &Path) -> Result<(), SensorError> {
        if let Some(parent) = path.parent()
            && !parent.is_dir()
        {
            return Err(SensorError::device(
                "camera",
                format!("missing directory {}", parent.display()),
            ));
        }
        File::create(path)
            .map(|_| ())
            .map_err(|e| SensorError::device("camera", e.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct SimSwitch {
    pub energized: bool,
}

impl PowerPhaseSwitch for SimSwitch {
    fn on(&mut self) -> Result<(), SensorError> {
        self.energized = true;
        Ok(())
    }

    fn off(&mut self) -> Result<(), SensorError> {
        self.energized = false;
        Ok(())
    }
}

