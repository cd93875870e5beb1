use crate::errors::AppResult;
use crate::report::replace_file;
use crate::utils::time::date_key;
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Everything the status page shows. Rebuilt for every refresh, never stored.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub date: NaiveDate,
    pub line_count: usize,
    pub log_tail: Vec<String>,
    pub chart: PathBuf,
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Chart reference as seen from the page: bare file name when both live in the
/// same directory, the full path otherwise.
pub fn chart_href(page: &Path, chart: &Path) -> String {
    let same_dir = page.parent().is_some() && page.parent() == chart.parent();
    match chart.file_name() {
        Some(name) if same_dir => name.to_string_lossy().to_string(),
        _ => chart.to_string_lossy().to_string(),
    }
}

pub fn render(snapshot: &StatusSnapshot, page: &Path) -> String {
    let date = date_key(snapshot.date);
    let href = escape(&chart_href(page, &snapshot.chart));

    let mut log = String::new();
    for line in &snapshot.log_tail {
        let _ = writeln!(log, "{}", escape(line));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="60">
<title>Solar station {date}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
pre {{ background: #f4f4f4; padding: 1em; overflow-x: auto; }}
</style>
</head>
<body>
<h1>Solar station</h1>
<p>Date: <strong>{date}</strong></p>
<p>Records stored today: <strong>{count}</strong></p>
<img src="{href}" alt="Power chart for {date}">
<h2>Log</h2>
<pre>{log}</pre>
</body>
</html>
"#,
        count = snapshot.line_count,
    )
}

pub fn write(page: &Path, snapshot: &StatusSnapshot) -> AppResult<()> {
    replace_file(page, render(snapshot, page).as_bytes())?;
    Ok(())
}
