//! Time utilities: path-safe keys for dates and times, log stamps, chart axis helpers.
//!
//! The acquisition cycle keeps a single `NaiveDateTime` per iteration and only
//! turns it into strings here, at the filesystem/log boundary.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Date key used for day directories and record files (`2022-10-19`).
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Time key used for image names and the first CSV column (`09_05_30`).
pub fn time_key(time: NaiveTime) -> String {
    time.format("%H_%M_%S").to_string()
}

/// Parse a time key back; tolerates surrounding whitespace from hand-edited files.
pub fn parse_time_key(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H_%M_%S").ok()
}

/// Stamp prepended to every operational log line.
pub fn log_stamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Time of day as fractional hours, the x axis of the power chart.
pub fn hours_of_day(time: NaiveTime) -> f64 {
    time.num_seconds_from_midnight() as f64 / 3600.0
}

/// Inverse of [`hours_of_day`], rendered as `HH:MM` for axis labels.
pub fn format_hours(hours: f64) -> String {
    let mins = (hours * 60.0).round().max(0.0) as i64;
    format!("{:02}:{:02}", mins / 60, mins % 60)
}
