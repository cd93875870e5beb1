use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::console::{success, warning};

/// Handle the `check` command. The caller has already validated `cfg`.
pub fn handle(cfg: &Config) -> AppResult<()> {
    success("Configuration is valid");
    println!("  data root       : {}", cfg.data_root().display());
    println!("  operating window: {}", cfg.window()?);
    println!("  batch size      : {}", cfg.batch_size);
    println!("  frame delay     : {}s", cfg.frame_delay_secs);
    println!("  report interval : {}s", cfg.report_interval_secs);
    println!("  status page     : {}", cfg.status_page_path().display());
    println!("  chart           : {}", cfg.chart_image_path().display());
    match &cfg.camera.command {
        Some(cmd) => println!("  camera          : {cmd} (timeout {}ms)", cfg.camera.timeout_ms),
        None => warning("No camera command configured: simulated camera will be used"),
    }
    Ok(())
}
