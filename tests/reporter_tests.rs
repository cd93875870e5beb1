use chrono::NaiveDate;
use solarlog::core::reporter::{Reporter, TickOutcome};
use solarlog::report::StatusSnapshot;
use solarlog::report::chart;
use solarlog::report::status_page::{chart_href, render};
use solarlog::storage::{DayStore, OpLog};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

mod common;
use common::{FakeClock, temp_root};

struct Setup {
    root: PathBuf,
    clock: FakeClock,
    store: DayStore,
    log: OpLog,
    chart: PathBuf,
}

fn setup(name: &str, now: &str) -> Setup {
    let root = temp_root(name);
    let clock = FakeClock::at(now);
    let log = OpLog::open(root.join("log.txt"), Arc::new(clock.clone()))
        .unwrap()
        .without_echo();
    Setup {
        store: DayStore::new(&root),
        chart: root.join("power.svg"),
        root,
        clock,
        log,
    }
}

impl Setup {
    fn reporter(&self) -> Reporter {
        Reporter::new(
            self.store.clone(),
            Arc::new(self.clock.clone()),
            self.log.clone(),
            self.chart.clone(),
        )
    }

    fn write_day(&self, date: &str, body: &str) {
        let dir = self.root.join(date);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{date}.csv")), body).unwrap();
    }

    fn log_text(&self) -> String {
        fs::read_to_string(self.log.path()).unwrap_or_default()
    }
}

#[test]
fn test_no_data_keeps_previous_chart() {
    let s = setup("reporter_no_data", "2022-10-19 12:00:00");
    fs::write(&s.chart, "previous chart").unwrap();

    assert_eq!(s.reporter().tick(), TickOutcome::NoData);
    assert_eq!(fs::read_to_string(&s.chart).unwrap(), "previous chart");
    assert!(s.log_text().contains("no data for 2022-10-19"));

    // an existing but empty day file is still "no data"
    s.write_day("2022-10-19", "");
    assert_eq!(s.reporter().tick(), TickOutcome::NoData);
    assert_eq!(fs::read_to_string(&s.chart).unwrap(), "previous chart");
}

#[test]
fn test_tick_renders_todays_power_chart() {
    let s = setup("reporter_render", "2022-10-19 12:00:00");
    s.write_day(
        "2022-10-19",
        "09_00_00,0.000,21.50,90.0\n09_00_10,36.000,21.50,90.0\n10_30_00,41.250,22.00,91.5\n",
    );
    // yesterday's data must not leak into today's chart
    s.write_day("2022-10-18", "09_00_00,999.000,21.50,90.0\n");

    assert_eq!(s.reporter().tick(), TickOutcome::Rendered { points: 3 });
    let svg = fs::read_to_string(&s.chart).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Power 2022-10-19"));
}

#[test]
fn test_partial_trailing_row_is_ignored() {
    let s = setup("reporter_partial", "2022-10-19 12:00:00");
    s.write_day(
        "2022-10-19",
        "09_00_00, 1.000, 21.50, 90.0\n09_00_10, 2.000, 21.50, 90.0\n09_00_2",
    );
    assert_eq!(s.reporter().tick(), TickOutcome::Rendered { points: 2 });

    s.write_day("2022-10-19", "09_00_00,1.000,21.50,90.0\n09_00_10,2.0");
    assert_eq!(s.reporter().tick(), TickOutcome::Rendered { points: 1 });
}

#[test]
fn test_clock_failure_skips_the_tick() {
    let s = setup("reporter_clock", "2022-10-19 12:00:00");
    s.write_day("2022-10-19", "09_00_00,1.000,21.50,90.0\n");
    s.clock.fail();

    assert_eq!(s.reporter().tick(), TickOutcome::Failed);
    assert!(!s.chart.exists());
}

#[test]
fn test_chart_axes_cover_the_samples() {
    let day = NaiveDate::from_ymd_opt(2022, 10, 19).unwrap();
    let points = vec![
        (chrono::NaiveTime::from_hms_opt(6, 30, 0).unwrap(), 10.0),
        (chrono::NaiveTime::from_hms_opt(14, 15, 0).unwrap(), 50.0),
    ];
    let ((x0, x1), (y0, y1)) = chart::ranges(&points);
    assert_eq!((x0, x1), (6.0, 15.0));
    assert_eq!(y0, 0.0);
    assert!(y1 > 50.0);

    // all-zero power still yields a drawable range
    let flat = vec![(chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(), 0.0)];
    let (_, (_, y1)) = chart::ranges(&flat);
    assert!(y1 > 0.0);
    assert!(chart::render_power_svg(day, &flat).is_ok());
}

#[test]
fn test_status_page_shows_date_count_and_escaped_log() {
    let page = Path::new("/srv/solar/status.html");
    let snapshot = StatusSnapshot {
        date: NaiveDate::from_ymd_opt(2022, 10, 19).unwrap(),
        line_count: 1234,
        log_tail: vec![
            "[2022-10-19 09:00:00]: Buffer saved".to_string(),
            "[2022-10-19 09:00:10]: <script>alert('x')</script> & more".to_string(),
        ],
        chart: PathBuf::from("/srv/solar/power.svg"),
    };

    let html = render(&snapshot, page);
    assert!(html.contains("2022-10-19"));
    assert!(html.contains("<strong>1234</strong>"));
    assert!(html.contains(r#"<meta http-equiv="refresh" content="60">"#));
    assert!(html.contains(r#"src="power.svg""#));
    assert!(html.contains("Buffer saved"));
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
    assert!(!html.contains("<script>"));
}

#[test]
fn test_chart_href_is_relative_only_next_to_the_page() {
    assert_eq!(
        chart_href(Path::new("/srv/www/status.html"), Path::new("/srv/www/power.svg")),
        "power.svg"
    );
    assert_eq!(
        chart_href(Path::new("/srv/www/status.html"), Path::new("/data/power.svg")),
        "/data/power.svg"
    );
}

#[test]
fn test_status_page_is_replaced_not_appended() {
    let root = temp_root("reporter_status_write");
    let page = root.join("status.html");
    let mut snapshot = StatusSnapshot {
        date: NaiveDate::from_ymd_opt(2022, 10, 19).unwrap(),
        line_count: 50,
        log_tail: Vec::new(),
        chart: root.join("power.svg"),
    };
    solarlog::report::status_page::write(&page, &snapshot).unwrap();
    snapshot.line_count = 100;
    solarlog::report::status_page::write(&page, &snapshot).unwrap();

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.contains("<strong>100</strong>"));
    assert!(!html.contains("<strong>50</strong>"));
    assert_eq!(html.matches("<html").count(), 1);
    assert!(!root.join("status.html.tmp").exists());
}

#[test]
fn test_spawned_reporter_draws_then_stops() {
    let s = setup("reporter_spawn", "2022-10-19 12:00:00");
    s.write_day("2022-10-19", "09_00_00,5.000,21.50,90.0\n");

    let handle = s.reporter().spawn(Duration::from_millis(20)).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !s.chart.exists() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(s.chart.exists(), "chart drawn by the reporter thread");
    assert!(handle.is_running());

    handle.stop();
    fs::remove_file(&s.chart).unwrap();
    thread::sleep(Duration::from_millis(100));
    assert!(!s.chart.exists(), "no ticks after stop");
}
