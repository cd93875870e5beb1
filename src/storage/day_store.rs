//! Day-partitioned record store.
//!
//! Layout under the data root:
//!   {root}/{YYYY-MM-DD}/{YYYY-MM-DD}.csv   append-only rows
//!   {root}/{YYYY-MM-DD}/{HH_MM_SS}.jpg     one image per capture
//!
//! The acquisition loop appends and the reporter reads the same file, so
//! every access goes through one shared lock.

use crate::models::Record;
use crate::utils::time::{date_key, parse_time_key, time_key};
use chrono::{NaiveDate, NaiveTime};
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Paths belonging to one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFile {
    pub date: NaiveDate,
    pub dir: PathBuf,
    pub records: PathBuf,
}

impl DayFile {
    pub fn image_path(&self, time: NaiveTime) -> PathBuf {
        self.dir.join(format!("{}.jpg", time_key(time)))
    }
}

#[derive(Debug, Clone)]
pub struct DayStore {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl DayStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn day_file(&self, date: NaiveDate) -> DayFile {
        let key = date_key(date);
        let dir = self.root.join(&key);
        let records = dir.join(format!("{key}.csv"));
        DayFile { date, dir, records }
    }

    /// Create the day directory and an empty record file if they do not exist yet.
    /// The flag is true when this call created the record file.
    pub fn ensure_day(&self, date: NaiveDate) -> io::Result<(DayFile, bool)> {
        let day = self.day_file(date);
        let _guard = self.guard();
        let created = Self::create_day(&day)?;
        Ok((day, created))
    }

    fn create_day(day: &DayFile) -> io::Result<bool> {
        if day.records.is_file() {
            return Ok(false);
        }
        fs::create_dir_all(&day.dir)?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&day.records)?;
        Ok(true)
    }

    /// Append `records` to the day's file and return its total line count.
    ///
    /// Rows read `HH_MM_SS, power, temperature, heading`. The csv delimiter is a
    /// single byte, so the space after each comma travels with the next field.
    pub fn append_rows(&self, day: &DayFile, records: &[Record]) -> io::Result<usize> {
        let _guard = self.guard();
        Self::create_day(day)?;

        let file = OpenOptions::new().append(true).open(&day.records)?;
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(file);
        for record in records {
            let [time, rest @ ..] = record.to_row();
            let padded = rest.into_iter().map(|f| format!(" {f}"));
            wtr.write_record(std::iter::once(time).chain(padded))?;
        }
        wtr.flush()?;
        drop(wtr);

        count_lines(&day.records)
    }

    pub fn line_count(&self, date: NaiveDate) -> io::Result<usize> {
        let day = self.day_file(date);
        let _guard = self.guard();
        count_lines(&day.records)
    }

    /// Time/power pairs of one day, in file order. `None` when the day has no file.
    ///
    /// Rows that do not parse (a half-written trailing row, a stray header) are skipped.
    pub fn read_power_series(&self, date: NaiveDate) -> io::Result<Option<Vec<(NaiveTime, f64)>>> {
        let day = self.day_file(date);
        let _guard = self.guard();
        if !day.records.is_file() {
            return Ok(None);
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&day.records)?;

        let mut points = Vec::new();
        for row in rdr.records().flatten() {
            let time = row.get(0).and_then(parse_time_key);
            let power = row.get(1).and_then(|p| p.parse::<f64>().ok());
            if let (Some(time), Some(power)) = (time, power)
                && row.len() >= 4
            {
                points.push((time, power));
            }
        }
        Ok(Some(points))
    }
}

pub fn count_lines(path: &Path) -> io::Result<usize> {
    let bytes = fs::read(path)?;
    Ok(bytes.split(|b| *b == b'\n').filter(|l| !l.is_empty()).count())
}
