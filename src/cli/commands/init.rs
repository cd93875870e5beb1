use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::console::{info, success};

/// Handle the `init` command: write the default configuration, never overwrite.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let path = cli.config_path();
    if Config::init(&path)? {
        success(format!("Config file created: {}", path.display()));
    } else {
        info(format!("Config file already exists: {}", path.display()));
    }
    Ok(())
}
