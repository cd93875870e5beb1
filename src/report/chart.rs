use crate::errors::{AppError, AppResult};
use crate::report::replace_file;
use crate::utils::time::{date_key, format_hours, hours_of_day};
use chrono::{NaiveDate, NaiveTime};
use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (1024, 480);

fn chart_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Report(format!("chart rendering failed: {e}"))
}

/// Axis ranges for a day of samples: whole hours on x, some headroom on y.
pub fn ranges(points: &[(NaiveTime, f64)]) -> ((f64, f64), (f64, f64)) {
    let hours = points.iter().map(|(t, _)| hours_of_day(*t));
    let first = hours.clone().fold(f64::INFINITY, f64::min);
    let last = hours.fold(f64::NEG_INFINITY, f64::max);

    let (x0, mut x1) = if first.is_finite() {
        (first.floor(), last.ceil())
    } else {
        (0.0, 24.0)
    };
    if x1 <= x0 {
        x1 = x0 + 1.0;
    }

    let peak = points.iter().map(|(_, p)| *p).fold(0.0, f64::max);
    let y1 = if peak > 0.0 { peak * 1.1 } else { 1.0 };

    ((x0, x1), (0.0, y1))
}

/// Filled line chart of power over time of day, as an SVG document.
pub fn render_power_svg(date: NaiveDate, points: &[(NaiveTime, f64)]) -> AppResult<String> {
    let ((x0, x1), (y0, y1)) = ranges(points);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Power {}", date_key(date)), ("sans-serif", 22).into_font())
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(60)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc("Time of day")
            .y_desc("Power (W)")
            .x_label_formatter(&|h: &f64| format_hours(*h))
            .y_label_formatter(&|w: &f64| format!("{w:.1}"))
            .draw()
            .map_err(chart_err)?;

        let series = points.iter().map(|(t, p)| (hours_of_day(*t), *p));
        chart
            .draw_series(AreaSeries::new(series, 0.0, BLUE.mix(0.25)).border_style(BLUE))
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// Render and atomically replace the chart at `path`.
pub fn write_power_chart(path: &Path, date: NaiveDate, points: &[(NaiveTime, f64)]) -> AppResult<()> {
    let svg = render_power_svg(date, points)?;
    replace_file(path, svg.as_bytes())?;
    Ok(())
}
