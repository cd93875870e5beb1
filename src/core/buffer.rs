//! Record buffering and day rotation.
//!
//! Records accumulate in memory and go to disk in batches. A batch never
//! mixes dates: a record for a new date first pushes the previous date's
//! records into their own file.

use crate::errors::{AppError, AppResult};
use crate::models::Record;
use crate::storage::DayStore;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordBuffer {
    day: Option<NaiveDate>,
    records: Vec<Record>,
    batch_size: usize,
}

impl RecordBuffer {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            day: None,
            records: Vec::with_capacity(batch_size),
            batch_size,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.batch_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Date of the buffered records, if any.
    pub fn day(&self) -> Option<NaiveDate> {
        if self.records.is_empty() {
            None
        } else {
            self.day
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn push(&mut self, day: NaiveDate, record: Record) {
        debug_assert!(self.day().is_none_or(|d| d == day));
        self.day = Some(day);
        self.records.push(record);
    }

    fn clear(&mut self) {
        self.records.clear();
        self.day = None;
    }
}

/// Outcome of one successful flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub day: NaiveDate,
    pub path: PathBuf,
    pub rows: usize,
    /// Total lines in the day's file after the write.
    pub line_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `retries` extra attempts after the first one, doubling `backoff` each time.
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self {
            attempts: retries.saturating_add(1),
            backoff,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(8))
    }
}

pub struct BatchWriter {
    buffer: RecordBuffer,
    store: DayStore,
    retry: RetryPolicy,
}

impl BatchWriter {
    pub fn new(store: DayStore, batch_size: usize, retry: RetryPolicy) -> Self {
        Self {
            buffer: RecordBuffer::new(batch_size),
            store,
            retry,
        }
    }

    pub fn buffer(&self) -> &RecordBuffer {
        &self.buffer
    }

    pub fn store(&self) -> &DayStore {
        &self.store
    }

    /// Buffer one record taken on `day`. Returns the flushes it caused:
    /// a rollover flush of the previous date and/or a full-batch flush.
    pub fn append(&mut self, day: NaiveDate, record: Record) -> AppResult<Vec<FlushReport>> {
        let mut reports = Vec::new();

        if self.buffer.day().is_some_and(|buffered| buffered != day)
            && let Some(report) = self.flush()?
        {
            reports.push(report);
        }

        self.buffer.push(day, record);

        if self.buffer.is_full()
            && let Some(report) = self.flush()?
        {
            reports.push(report);
        }

        Ok(reports)
    }

    /// Write every buffered record to its day's file, retrying with backoff.
    /// The buffer is cleared only after the write succeeded.
    pub fn flush(&mut self) -> AppResult<Option<FlushReport>> {
        let Some(date) = self.buffer.day() else {
            return Ok(None);
        };
        let day = self.store.day_file(date);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.append_rows(&day, self.buffer.records()) {
                Ok(line_count) => {
                    let rows = self.buffer.len();
                    self.buffer.clear();
                    return Ok(Some(FlushReport {
                        day: date,
                        path: day.records,
                        rows,
                        line_count,
                    }));
                }
                Err(e) if attempt < self.retry.attempts => {
                    let delay = self.retry.delay(attempt);
                    log::warn!(
                        "flush to {} failed (attempt {attempt}/{}): {e}; retrying in {delay:?}",
                        day.records.display(),
                        self.retry.attempts
                    );
                    thread::sleep(delay);
                }
                Err(source) => {
                    return Err(AppError::Storage {
                        path: day.records,
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}
