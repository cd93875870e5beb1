#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::NaiveDateTime;
use solarlog::config::{CameraConfig, Config};
use solarlog::core::station::Station;
use solarlog::devices::{
    Camera, Clock, ClockError, Devices, MagStatus, Magnetometer, PowerMeter, PowerPhaseSwitch,
    SensorError,
};
use solarlog::storage::{DayStore, OpLog};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub fn solarlog() -> Command {
    cargo_bin_cmd!("solarlog")
}

/// Create an empty, unique data root inside the system temp dir
pub fn temp_root(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("solarlog_{}_{}", name, std::process::id()));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp root");
    path
}

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid datetime literal")
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read file")
        .lines()
        .map(|l| l.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock frozen at a settable instant; `None` makes every read fail.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<Option<NaiveDateTime>>>,
}

impl FakeClock {
    pub fn at(s: &str) -> Self {
        Self {
            now: Arc::new(Mutex::new(Some(dt(s)))),
        }
    }

    pub fn set(&self, s: &str) {
        *self.now.lock().unwrap() = Some(dt(s));
    }

    pub fn fail(&self) {
        *self.now.lock().unwrap() = None;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        self.now
            .lock()
            .unwrap()
            .ok_or_else(|| ClockError::Read("RTC not responding".into()))
    }
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MeterState {
    pub ready: bool,
    pub current: f64,
    pub voltage: f64,
    pub fail_reads: bool,
    pub hang_on_wake: Option<Duration>,
    pub wakes: usize,
    pub configured: bool,
    pub low_battery: Option<f64>,
}

impl Default for MeterState {
    fn default() -> Self {
        Self {
            ready: true,
            current: 2.0,
            voltage: 18.0,
            fail_reads: false,
            hang_on_wake: None,
            wakes: 0,
            configured: false,
            low_battery: None,
        }
    }
}

pub struct FakeMeter(pub Arc<Mutex<MeterState>>);

impl PowerMeter for FakeMeter {
    fn wake(&mut self) -> Result<(), SensorError> {
        let hang = {
            let mut s = self.0.lock().unwrap();
            s.wakes += 1;
            s.hang_on_wake
        };
        if let Some(d) = hang {
            thread::sleep(d);
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<(), SensorError> {
        self.0.lock().unwrap().configured = true;
        Ok(())
    }

    fn set_low_battery_threshold(&mut self, volts: f64) -> Result<(), SensorError> {
        self.0.lock().unwrap().low_battery = Some(volts);
        Ok(())
    }

    fn conversion_ready(&mut self) -> Result<bool, SensorError> {
        Ok(self.0.lock().unwrap().ready)
    }

    fn read_current(&mut self) -> Result<f64, SensorError> {
        let s = self.0.lock().unwrap();
        if s.fail_reads {
            return Err(SensorError::device("power-meter", "i2c nack"));
        }
        Ok(s.current)
    }

    fn read_voltage(&mut self) -> Result<f64, SensorError> {
        let s = self.0.lock().unwrap();
        if s.fail_reads {
            return Err(SensorError::device("power-meter", "i2c nack"));
        }
        Ok(s.voltage)
    }
}

#[derive(Debug, Clone)]
pub struct CompassState {
    pub ready: bool,
    pub fail: bool,
    pub heading: f64,
    pub temperature: f64,
}

impl Default for CompassState {
    fn default() -> Self {
        Self {
            ready: true,
            fail: false,
            heading: 200.0,
            temperature: 25.5,
        }
    }
}

pub struct FakeCompass(pub Arc<Mutex<CompassState>>);

impl Magnetometer for FakeCompass {
    fn status(&mut self) -> Result<MagStatus, SensorError> {
        let s = self.0.lock().unwrap();
        if s.fail {
            return Err(SensorError::device("compass", "bus error"));
        }
        Ok(MagStatus {
            ready: s.ready,
            ..MagStatus::default()
        })
    }

    fn heading(&mut self) -> Result<f64, SensorError> {
        Ok(self.0.lock().unwrap().heading)
    }

    fn temperature(&mut self) -> Result<f64, SensorError> {
        Ok(self.0.lock().unwrap().temperature)
    }
}

#[derive(Debug, Default)]
pub struct CameraState {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub shots: Vec<PathBuf>,
}

pub struct FakeCamera(pub Arc<Mutex<CameraState>>);

impl Camera for FakeCamera {
    fn capture(&mut self, path: &Path) -> Result<(), SensorError> {
        let delay = self.0.lock().unwrap().delay;
        if let Some(d) = delay {
            thread::sleep(d);
        }
        let mut s = self.0.lock().unwrap();
        if s.fail {
            return Err(SensorError::device("camera", "mmal: no data received"));
        }
        fs::write(path, b"jpeg").map_err(|e| SensorError::device("camera", e.to_string()))?;
        s.shots.push(path.to_path_buf());
        Ok(())
    }
}

/// Records every switch command: true = on, false = off.
pub struct FakeSwitch(pub Arc<Mutex<Vec<bool>>>);

impl PowerPhaseSwitch for FakeSwitch {
    fn on(&mut self) -> Result<(), SensorError> {
        self.0.lock().unwrap().push(true);
        Ok(())
    }

    fn off(&mut self) -> Result<(), SensorError> {
        self.0.lock().unwrap().push(false);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rig: a station wired to fakes in a temp data root
// ---------------------------------------------------------------------------

pub struct Rig {
    pub root: PathBuf,
    pub cfg: Config,
    pub clock: FakeClock,
    pub meter: Arc<Mutex<MeterState>>,
    pub compass: Arc<Mutex<CompassState>>,
    pub camera: Arc<Mutex<CameraState>>,
    pub relay: Arc<Mutex<Vec<bool>>>,
    pub store: DayStore,
    pub log: OpLog,
}

/// Config tuned for tests: no sleeps, short device timeout, no storage backoff.
pub fn test_config(root: &Path) -> Config {
    Config {
        data_root: root.to_string_lossy().to_string(),
        frame_delay_secs: 0,
        settle_secs: 0,
        gate_poll_secs: 0,
        device_timeout_ms: 200,
        camera: CameraConfig {
            timeout_ms: 1000,
            ..CameraConfig::default()
        },
        storage_retries: 2,
        storage_backoff_ms: 0,
        batch_size: 50,
        ..Config::default()
    }
}

impl Rig {
    pub fn new(name: &str, now: &str) -> Self {
        let root = temp_root(name);
        let cfg = test_config(&root);
        let clock = FakeClock::at(now);
        let log = OpLog::open(cfg.log_path(), Arc::new(clock.clone()))
            .expect("open log")
            .without_echo();
        Self {
            store: DayStore::new(&root),
            root,
            cfg,
            clock,
            meter: Arc::new(Mutex::new(MeterState::default())),
            compass: Arc::new(Mutex::new(CompassState::default())),
            camera: Arc::new(Mutex::new(CameraState::default())),
            relay: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }

    pub fn devices(&self) -> Devices {
        Devices {
            meter: Box::new(FakeMeter(self.meter.clone())),
            compass: Box::new(FakeCompass(self.compass.clone())),
            camera: Box::new(FakeCamera(self.camera.clone())),
            relay: Box::new(FakeSwitch(self.relay.clone())),
        }
    }

    pub fn station(&self) -> Station {
        Station::new(
            &self.cfg,
            self.devices(),
            Arc::new(self.clock.clone()),
            self.store.clone(),
            self.log.clone(),
        )
        .expect("build station")
    }

    pub fn day_csv(&self, date: &str) -> PathBuf {
        self.root.join(date).join(format!("{date}.csv"))
    }

    pub fn log_text(&self) -> String {
        fs::read_to_string(self.log.path()).unwrap_or_default()
    }
}
