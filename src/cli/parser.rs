use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for solarlog.
/// Tunables live in the YAML config; the CLI only picks the file and the mode.
#[derive(Parser)]
#[command(
    name = "solarlog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Solar station telemetry logger: power, compass and camera into day-partitioned CSV",
    long_about = None
)]
pub struct Cli {
    /// Path of the YAML configuration file
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the data root (useful for tests or a second USB stick)
    #[arg(global = true, long = "data-root", value_name = "DIR")]
    pub data_root: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Commands {
    /// Acquire until interrupted (default)
    Run,

    /// Load and validate the configuration, print a summary and exit
    Check,

    /// Write a default configuration file if none exists
    Init,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::config_file)
    }
}
