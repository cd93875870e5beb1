//! The acquisition controller.
//!
//! One `Station` owns everything the loop mutates: relay phase, latched
//! electrical values, the record buffer and the device workers. Each step of
//! a cycle is isolated; only an implausible clock year (or storage that keeps
//! failing) stops the loop.

use crate::config::Config;
use crate::core::buffer::{BatchWriter, FlushReport, RecordBuffer, RetryPolicy};
use crate::core::gate::{OperatingWindow, WaitNotice};
use crate::core::reporter::StatusPublisher;
use crate::core::shutdown::Shutdown;
use crate::devices::{
    Camera, Clock, DeviceWorker, Devices, Magnetometer, PowerMeter, PowerPhaseSwitch, SensorError,
};
use crate::errors::{AppError, AppResult};
use crate::models::{Record, RelayPhase};
use crate::storage::{DayStore, OpLog};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::sync::Arc;
use std::time::Duration;

type MeterRead = fn(&mut Box<dyn PowerMeter>) -> Result<f64, SensorError>;

/// Why a cycle produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ClockUnavailable,
    CompassNotReady,
    CompassFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Recorded { flushes: Vec<FlushReport> },
    Skipped(SkipReason),
    Interrupted,
}

/// Heading in degrees folded into [0, 360).
pub fn normalize_heading(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

pub struct Station {
    meter: DeviceWorker<Box<dyn PowerMeter>>,
    compass: DeviceWorker<Box<dyn Magnetometer>>,
    camera: DeviceWorker<Box<dyn Camera>>,
    relay: DeviceWorker<Box<dyn PowerPhaseSwitch>>,
    clock: Arc<dyn Clock>,
    log: OpLog,
    writer: BatchWriter,
    status: StatusPublisher,
    window: OperatingWindow,
    notice: WaitNotice,
    phase: RelayPhase,
    current: f64,
    voltage: f64,
    frame_delay: Duration,
    gate_poll: Duration,
    settle: Duration,
    declination: f64,
    low_battery_volts: f64,
    min_year: i32,
}

impl Station {
    pub fn new(
        cfg: &Config,
        devices: Devices,
        clock: Arc<dyn Clock>,
        store: DayStore,
        log: OpLog,
    ) -> AppResult<Self> {
        cfg.validate()?;
        let timeout = cfg.device_timeout();
        let retry = RetryPolicy::new(cfg.storage_retries, cfg.storage_backoff());

        Ok(Self {
            meter: DeviceWorker::spawn("power-meter", devices.meter, timeout)?,
            compass: DeviceWorker::spawn("compass", devices.compass, timeout)?,
            camera: DeviceWorker::spawn("camera", devices.camera, cfg.camera_timeout())?,
            relay: DeviceWorker::spawn("relay", devices.relay, timeout)?,
            clock,
            status: StatusPublisher::from_config(cfg, log.clone()),
            log,
            writer: BatchWriter::new(store, cfg.batch_size, retry),
            window: cfg.window()?,
            notice: WaitNotice::new(cfg.wait_notice_every),
            phase: RelayPhase::INITIAL,
            current: 0.0,
            voltage: 0.0,
            frame_delay: cfg.frame_delay(),
            gate_poll: cfg.gate_poll(),
            settle: cfg.settle(),
            declination: cfg.declination_offset,
            low_battery_volts: cfg.low_battery_volts,
            min_year: cfg.min_plausible_year,
        })
    }

    pub fn phase(&self) -> RelayPhase {
        self.phase
    }

    /// Latched (amps, volts).
    pub fn latched(&self) -> (f64, f64) {
        (self.current, self.voltage)
    }

    pub fn buffer(&self) -> &RecordBuffer {
        self.writer.buffer()
    }

    /// Configure the power meter and let it settle. False if shutdown arrived meanwhile.
    pub fn initialize(&mut self, shutdown: &Shutdown) -> bool {
        if let Err(e) = self.meter.call(|m| m.configure()) {
            self.log.warn(format!("Power meter configuration failed: {e}"));
        }
        let volts = self.low_battery_volts;
        if let Err(e) = self.meter.call(move |m| m.set_low_battery_threshold(volts)) {
            self.log.warn(format!("Power meter low-battery threshold failed: {e}"));
        }
        if !shutdown.sleep(self.settle) {
            return false;
        }
        self.log.info("Initialization complete");
        true
    }

    /// Acquire until shutdown or a fatal error, then flush whatever is buffered.
    pub fn run(&mut self, shutdown: &Shutdown) -> AppResult<()> {
        let result = self.acquire(shutdown);
        if let Err(e) = &result {
            self.log.error(format!("Program exit: {e}"));
        }

        match self.writer.flush() {
            Ok(Some(report)) => {
                self.log.info(format!(
                    "Flushed {} pending records to {} before exit",
                    report.rows,
                    report.path.display()
                ));
                self.publish(&report);
            }
            Ok(None) => {}
            Err(e) => self.log.error(format!("Pending records lost: {e}")),
        }
        result
    }

    fn acquire(&mut self, shutdown: &Shutdown) -> AppResult<()> {
        while !shutdown.requested() {
            if !self.window_open() {
                if !shutdown.sleep(self.gate_poll) {
                    break;
                }
                continue;
            }
            self.run_cycle(shutdown)?;
        }
        self.log.info("Shutdown requested");
        Ok(())
    }

    /// Gate check for the current hour, with a rate-limited waiting notice.
    pub fn window_open(&mut self) -> bool {
        match self.clock.now() {
            Ok(now) if self.window.allows(now.hour()) => {
                self.notice.reset();
                true
            }
            Ok(now) => {
                if self.notice.closed_poll() {
                    self.log.info(format!(
                        "Outside operating window {} (now {:02}h); waiting",
                        self.window,
                        now.hour()
                    ));
                }
                false
            }
            Err(e) => {
                if self.notice.closed_poll() {
                    self.log.warn(format!("Cannot read clock to check the window: {e}"));
                }
                false
            }
        }
    }

    /// One sense → capture → record iteration.
    pub fn run_cycle(&mut self, shutdown: &Shutdown) -> AppResult<CycleOutcome> {
        if let Err(e) = self.meter.call(|m| m.wake()) {
            self.log.warn(format!("Power meter wake failed: {e}"));
        }
        if !shutdown.sleep(self.frame_delay) {
            return Ok(CycleOutcome::Interrupted);
        }

        self.sample_phase();

        let now = match self.clock.now() {
            Ok(now) => now,
            Err(e) => {
                self.log.error(format!("{e}; cycle skipped"));
                return Ok(CycleOutcome::Skipped(SkipReason::ClockUnavailable));
            }
        };
        if now.year() < self.min_year {
            self.log.error("ERROR: Please reset the time of the RTC module!");
            return Err(AppError::ImplausibleClock {
                year: now.year(),
                min: self.min_year,
            });
        }
        let (date, time) = (now.date(), now.time());

        let compass = self.read_compass();
        self.capture(date, time);

        let (temperature, heading) = match compass {
            Ok(reading) => reading,
            Err(reason) => return Ok(CycleOutcome::Skipped(reason)),
        };

        let record = Record::new(time, self.current * self.voltage, temperature, heading);
        let flushes = self.writer.append(date, record)?;
        for report in &flushes {
            self.log.info(format!(
                "Buffer saved to {} ({} lines)",
                report.path.display(),
                report.line_count
            ));
            self.publish(report);
        }
        Ok(CycleOutcome::Recorded { flushes })
    }

    fn publish(&self, report: &FlushReport) {
        if let Err(e) = self.status.publish(report) {
            self.log.warn(format!(
                "Status page {} not updated: {e}",
                self.status.page().display()
            ));
        }
    }

    /// Flip the relay and latch the quantity the meter was wired to.
    fn sample_phase(&mut self) {
        let leaving = self.phase;
        self.phase = leaving.next();

        match leaving {
            RelayPhase::SenseCurrent => {
                if let Err(e) = self.relay.call(|r| r.off()) {
                    self.log.warn(format!("Relay switch failed: {e}"));
                }
                if let Some(amps) = self.sample(|m| m.read_current(), leaving) {
                    self.current = amps;
                }
            }
            RelayPhase::SenseVoltage => {
                if let Err(e) = self.relay.call(|r| r.on()) {
                    self.log.warn(format!("Relay switch failed: {e}"));
                }
                if let Some(volts) = self.sample(|m| m.read_voltage(), leaving) {
                    self.voltage = volts;
                }
            }
        }
    }

    /// Read one quantity if a conversion is ready; `None` keeps the latched value.
    fn sample(&self, read: MeterRead, phase: RelayPhase) -> Option<f64> {
        let result = self.meter.call(move |m| {
            if m.conversion_ready()? {
                read(m).map(Some)
            } else {
                Ok(None)
            }
        });

        match result {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                log::debug!("{} conversion not ready; keeping previous value", phase.as_str());
                None
            }
            Err(e) => {
                self.log.warn(format!(
                    "Power meter {} read failed: {e}; keeping previous value",
                    phase.as_str()
                ));
                None
            }
        }
    }

    /// (temperature, heading) or the reason the record must be skipped.
    fn read_compass(&self) -> Result<(f64, f64), SkipReason> {
        let reading = self.compass.call(|c| {
            let status = c.status()?;
            if !status.ready {
                return Ok(None);
            }
            Ok(Some((c.temperature()?, c.heading()?)))
        });

        match reading {
            Ok(Some((temperature, raw))) => Ok((temperature, normalize_heading(raw + self.declination))),
            Ok(None) => {
                self.log.warn("Compass data is not ready; record skipped");
                Err(SkipReason::CompassNotReady)
            }
            Err(e) => {
                self.log.warn(format!("Compass read failed: {e}; record skipped"));
                Err(SkipReason::CompassFailed)
            }
        }
    }

    fn capture(&self, date: NaiveDate, time: NaiveTime) {
        let day = match self.writer.store().ensure_day(date) {
            Ok((day, created)) => {
                if created {
                    self.log.info(format!("Started new day in {}", day.dir.display()));
                }
                day
            }
            Err(e) => {
                self.log.error(format!("Cannot prepare day directory: {e}; image skipped"));
                return;
            }
        };

        let path = day.image_path(time);
        if let Err(e) = self.camera.call(move |c| c.capture(&path)) {
            self.log.warn(format!("Image capture failed: {e}"));
        }
    }
}
