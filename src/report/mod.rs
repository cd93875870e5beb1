// src/report/mod.rs

pub mod chart;
pub mod status_page;

pub use status_page::StatusSnapshot;

use std::fs;
use std::io;
use std::path::Path;

/// Overwrite `path` without ever exposing a half-written file to readers:
/// write a sibling temp file, then rename over the target.
pub(crate) fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
