use super::{Camera, SensorError};
use crate::config::CameraConfig;
use std::path::Path;
use std::process::{Command, Stdio};

/// Camera driven by an external still-capture program (`libcamera-still`,
/// `rpicam-still`, ...). Resolution, gain and shutter are fixed at startup.
#[derive(Debug, Clone)]
pub struct CommandCamera {
    program: String,
    width: u32,
    height: u32,
    iso: u32,
    shutter_us: u32,
    extra_args: Vec<String>,
}

impl CommandCamera {
    pub fn from_config(cfg: &CameraConfig) -> Option<Self> {
        let program = cfg.command.as_ref()?.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self {
            program: program.to_string(),
            width: cfg.width,
            height: cfg.height,
            iso: cfg.iso,
            shutter_us: cfg.shutter_us,
            extra_args: cfg.extra_args.clone(),
        })
    }

    /// Arguments for one capture; ISO is mapped onto analogue gain (ISO 100 = 1.0).
    /// `-t 1` skips the default 5 s preview delay of `rpicam-still`.
    pub fn args_for(&self, path: &Path) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            "-t".to_string(),
            "1".to_string(),
            "-o".to_string(),
            path.to_string_lossy().to_string(),
            "--width".to_string(),
            self.width.to_string(),
            "--height".to_string(),
            self.height.to_string(),
            "--shutter".to_string(),
            self.shutter_us.to_string(),
            "--gain".to_string(),
            format!("{:.2}", self.iso as f64 / 100.0),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl Camera for CommandCamera {
    fn capture(&mut self, path: &Path) -> Result<(), SensorError> {
        let output = Command::new(&self.program)
            .args(self.args_for(path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SensorError::device("camera", format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SensorError::device(
                "camera",
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }
        Ok(())
    }
}
