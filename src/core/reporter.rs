//! Chart and status page generation.
//!
//! `Reporter` redraws the power chart on its own ticker thread, independent of
//! the acquisition cadence. `StatusPublisher` rewrites the status page right
//! after each flush, from the acquisition thread.

use crate::config::Config;
use crate::core::buffer::FlushReport;
use crate::devices::Clock;
use crate::errors::AppResult;
use crate::report::{StatusSnapshot, chart, status_page};
use crate::storage::{DayStore, OpLog};
use crate::utils::time::date_key;
use crossbeam_channel::{Sender, bounded, select, tick};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What a single reporter tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered { points: usize },
    NoData,
    Failed,
}

pub struct Reporter {
    store: DayStore,
    clock: Arc<dyn Clock>,
    log: OpLog,
    chart: PathBuf,
}

impl Reporter {
    pub fn new(store: DayStore, clock: Arc<dyn Clock>, log: OpLog, chart: PathBuf) -> Self {
        Self {
            store,
            clock,
            log,
            chart,
        }
    }

    pub fn from_config(cfg: &Config, store: DayStore, clock: Arc<dyn Clock>, log: OpLog) -> Self {
        Self::new(store, clock, log, cfg.chart_image_path())
    }

    /// Redraw today's chart. Never fails: problems are logged and the previous
    /// chart stays in place.
    pub fn tick(&self) -> TickOutcome {
        let today = match self.clock.now() {
            Ok(now) => now.date(),
            Err(e) => {
                self.log.warn(format!("Reporter: {e}; chart not updated"));
                return TickOutcome::Failed;
            }
        };

        let points = match self.store.read_power_series(today) {
            Ok(Some(points)) if !points.is_empty() => points,
            Ok(_) => {
                self.log
                    .info(format!("Reporter: no data for {} yet", date_key(today)));
                return TickOutcome::NoData;
            }
            Err(e) => {
                self.log.warn(format!("Reporter: cannot read records: {e}"));
                return TickOutcome::Failed;
            }
        };

        match chart::write_power_chart(&self.chart, today, &points) {
            Ok(()) => {
                log::debug!("chart {} redrawn from {} points", self.chart.display(), points.len());
                TickOutcome::Rendered {
                    points: points.len(),
                }
            }
            Err(e) => {
                self.log.warn(format!("Reporter: {e}"));
                TickOutcome::Failed
            }
        }
    }

    /// Start the ticker thread. It draws once right away, then every `interval`,
    /// until the returned handle is stopped or dropped.
    pub fn spawn(self, interval: Duration) -> io::Result<ReporterHandle> {
        let (stop, stopped) = bounded::<()>(0);
        let join = thread::Builder::new()
            .name("reporter".into())
            .spawn(move || {
                let ticker = tick(interval);
                self.tick();
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            self.tick();
                        }
                        recv(stopped) -> _ => break,
                    }
                }
                log::debug!("reporter stopped");
            })?;
        Ok(ReporterHandle {
            stop: Some(stop),
            join: Some(join),
        })
    }
}

/// Lifecycle handle of the reporter thread.
pub struct ReporterHandle {
    stop: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// Stop ticking and wait for an in-flight tick to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    fn shutdown(&mut self) {
        self.stop.take();
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            log::error!("reporter thread panicked");
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Rewrites the status page after every flush.
pub struct StatusPublisher {
    page: PathBuf,
    chart: PathBuf,
    tail_lines: usize,
    log: OpLog,
}

impl StatusPublisher {
    pub fn new(page: PathBuf, chart: PathBuf, tail_lines: usize, log: OpLog) -> Self {
        Self {
            page,
            chart,
            tail_lines,
            log,
        }
    }

    pub fn from_config(cfg: &Config, log: OpLog) -> Self {
        Self::new(
            cfg.status_page_path(),
            cfg.chart_image_path(),
            cfg.log_tail_lines,
            log,
        )
    }

    pub fn page(&self) -> &PathBuf {
        &self.page
    }

    pub fn publish(&self, report: &FlushReport) -> AppResult<()> {
        let log_tail = self.log.tail(self.tail_lines)?;
        let snapshot = StatusSnapshot {
            date: report.day,
            line_count: report.line_count,
            log_tail,
            chart: self.chart.clone(),
        };
        status_page::write(&self.page, &snapshot)
    }
}
