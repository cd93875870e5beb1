use crate::core::gate::OperatingWindow;
use crate::errors::{AppError, AppResult};
use crate::utils::path::{config_dir, expand_tilde};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Station configuration, fixed for the whole process lifetime.
///
/// Every key is optional in the YAML file; missing keys take the defaults of
/// the field station (Raspberry Pi with a USB stick as data root).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_root: String,
    pub frame_delay_secs: u64,
    pub batch_size: usize,
    pub start_hour: u32,
    pub stop_hour: u32,
    pub gate_poll_secs: u64,
    pub wait_notice_every: u32,
    pub report_interval_secs: u64,
    pub declination_offset: f64,
    pub min_plausible_year: i32,
    pub device_timeout_ms: u64,
    pub storage_retries: u32,
    pub storage_backoff_ms: u64,
    pub settle_secs: u64,
    pub low_battery_volts: f64,
    pub max_expected_amps: f64,
    pub status_page: Option<String>,
    pub chart_path: Option<String>,
    pub log_tail_lines: usize,
    pub camera: CameraConfig,
}

/// External capture program settings; `command: None` selects the simulated camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub command: Option<String>,
    pub width: u32,
    pub height: u32,
    pub iso: u32,
    pub shutter_us: u32,
    /// Budget for one capture, separate from the I2C device timeout.
    pub timeout_ms: u64,
    pub extra_args: Vec<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            command: None,
            width: 2592,
            height: 1944,
            iso: 20,
            shutter_us: 200,
            timeout_ms: 15000,
            extra_args: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: "/media/pi/usb-stick/solar/data".to_string(),
            frame_delay_secs: 10,
            batch_size: 50,
            start_hour: 6,
            stop_hour: 18,
            gate_poll_secs: 30,
            wait_notice_every: 20,
            report_interval_secs: 900,
            declination_offset: -108.0,
            min_plausible_year: 2022,
            device_timeout_ms: 5000,
            storage_retries: 3,
            storage_backoff_ms: 500,
            settle_secs: 3,
            low_battery_volts: 5.0,
            max_expected_amps: 25.0,
            status_page: None,
            chart_path: None,
            log_tail_lines: 20,
            camera: CameraConfig::default(),
        }
    }
}

impl Config {
    /// Return the full path of the default config file
    pub fn config_file() -> PathBuf {
        config_dir().join("solarlog.yaml")
    }

    /// Load configuration from `path`, or return defaults if the file is missing.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write a default configuration file. Returns false when one already exists.
    pub fn init(path: &Path) -> AppResult<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(&Self::default())
            .map_err(|e| AppError::Config(format!("cannot serialize defaults: {e}")))?;
        fs::write(path, yaml)?;
        Ok(true)
    }

    /// Fail-fast checks run once at startup.
    pub fn validate(&self) -> AppResult<()> {
        self.window()?;
        if self.batch_size == 0 {
            return Err(AppError::Config("batch_size must be at least 1".into()));
        }
        if self.report_interval_secs == 0 {
            return Err(AppError::Config(
                "report_interval_secs must be at least 1".into(),
            ));
        }
        if self.device_timeout_ms == 0 {
            return Err(AppError::Config("device_timeout_ms must be at least 1".into()));
        }
        if self.camera.timeout_ms == 0 {
            return Err(AppError::Config("camera.timeout_ms must be at least 1".into()));
        }
        if self.data_root.trim().is_empty() {
            return Err(AppError::Config("data_root must not be empty".into()));
        }
        Ok(())
    }

    pub fn window(&self) -> AppResult<OperatingWindow> {
        OperatingWindow::new(self.start_hour, self.stop_hour)
    }

    pub fn data_root(&self) -> PathBuf {
        expand_tilde(&self.data_root)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_root().join("log.txt")
    }

    pub fn status_page_path(&self) -> PathBuf {
        match &self.status_page {
            Some(p) => expand_tilde(p),
            None => self.data_root().join("status.html"),
        }
    }

    pub fn chart_image_path(&self) -> PathBuf {
        match &self.chart_path {
            Some(p) => expand_tilde(p),
            None => self.data_root().join("power.svg"),
        }
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_secs(self.frame_delay_secs)
    }

    pub fn gate_poll(&self) -> Duration {
        Duration::from_secs(self.gate_poll_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_millis(self.device_timeout_ms)
    }

    pub fn camera_timeout(&self) -> Duration {
        Duration::from_millis(self.camera.timeout_ms)
    }

    pub fn storage_backoff(&self) -> Duration {
        Duration::from_millis(self.storage_backoff_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}
