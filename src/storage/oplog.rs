//! Operational log: `{data_root}/log.txt`, echoed to the console.
//!
//! Shared by the acquisition loop and the reporter thread; a single mutex
//! around the file handle keeps lines whole.

use crate::devices::Clock;
use crate::ui::console;
use crate::utils::time::log_stamp;
use log::Level;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

const TAIL_WINDOW: u64 = 8 * 1024;

#[derive(Clone)]
pub struct OpLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
    clock: Arc<dyn Clock>,
    echo: bool,
}

impl OpLog {
    pub fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Arc::new(Mutex::new(file)),
            clock,
            echo: true,
        })
    }

    /// Disable the console echo (tests, `--quiet` style embedding).
    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.append(Level::Info, msg);
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.append(Level::Warn, msg);
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.append(Level::Error, msg);
    }

    /// Timestamp and write one line. A failing clock yields an untimestamped
    /// line; a failing disk is reported on stderr only.
    pub fn append(&self, level: Level, msg: impl fmt::Display) {
        let line = match self.clock.now() {
            Ok(now) => format!("[{}]: {}", log_stamp(now), msg),
            Err(_) => format!("[--]: {}", msg),
        };

        {
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = writeln!(file, "{line}") {
                console::error(format!("cannot write {}: {e}", self.path.display()));
            }
        }

        if self.echo {
            console::echo(level, &line);
        }
    }

    /// Last `n` lines of the log file in their original order.
    ///
    /// Reads backwards from the end in growing windows, so the cost follows `n`
    /// and not the size of a log that is never rotated.
    pub fn tail(&self, n: usize) -> io::Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let _file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let mut reader = File::open(&self.path)?;
        let len = reader.metadata()?.len();

        let mut window = TAIL_WINDOW.min(len);
        loop {
            let start = len - window;
            reader.seek(SeekFrom::Start(start))?;
            let mut buf = Vec::with_capacity(window as usize);
            (&mut reader).take(window).read_to_end(&mut buf)?;

            let text = String::from_utf8_lossy(&buf);
            let lines: Vec<&str> = text.lines().collect();
            // The first line of a window that starts mid-file may be cut.
            let complete = if start > 0 { lines.len().saturating_sub(1) } else { lines.len() };
            if complete >= n || start == 0 {
                let skip = lines.len() - complete.min(n);
                return Ok(lines[skip..].iter().map(|l| l.to_string()).collect());
            }
            window = window.saturating_mul(2).min(len);
        }
    }
}
