//! solarlog library root.
//! Exposes the CLI parser, the high-level run() function and the station modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod devices;
pub mod errors;
pub mod models;
pub mod report;
pub mod storage;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Check => cli::commands::check::handle(cfg),
        Commands::Run => cli::commands::run::handle(cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init()
        .ok();

    let cli = Cli::parse();

    // `init` must work even when the existing file does not parse.
    if cli.command == Some(Commands::Init) {
        return cli::commands::init::handle(&cli);
    }

    let mut cfg = Config::load(&cli.config_path())?;
    if let Some(root) = &cli.data_root {
        cfg.data_root = root.clone();
    }
    cfg.validate()?;

    dispatch(&cli, &cfg)
}
