//! Unified application error type.
//! Everything that can stop the station (or the startup CLI) is an AppError.
//! Device-level failures live in `devices::SensorError` / `devices::ClockError`
//! and are logged by the acquisition cycle instead of being propagated.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    // ---------------------------
    // Fatal runtime conditions
    // ---------------------------
    #[error("Clock reports year {year}, expected at least {min}: reset the RTC")]
    ImplausibleClock { year: i32, min: i32 },

    #[error("Storage failure on {path} after {attempts} attempts: {source}")]
    Storage {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    // ---------------------------
    // Reporting (never fatal, surfaced to the log)
    // ---------------------------
    #[error("Report error: {0}")]
    Report(String),

    // ---------------------------
    // Process plumbing
    // ---------------------------
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type AppResult<T> = Result<T, AppError>;
