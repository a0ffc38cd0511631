use crate::errors::{Result, WatchError};
use crate::report::figure::{Figure, FIGURE_HEIGHT, FIGURE_WIDTH, X_AXIS_LABEL, Y_AXIS_LABEL};
use chrono::{Duration, NaiveDate};
use log::debug;
use plotters::prelude::*;
use std::path::Path;

fn chart_err<E: std::fmt::Display>(e: E) -> WatchError {
    WatchError::ChartError(e.to_string())
}

/// Widen a degenerate range so the axis still has some extent.
fn pad_values((lo, hi): (f64, f64)) -> (f64, f64) {
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        let margin = (hi - lo) * 0.05;
        (lo - margin, hi + margin)
    }
}

fn pad_dates((start, end): (NaiveDate, NaiveDate)) -> (NaiveDate, NaiveDate) {
    if start == end {
        (start - Duration::days(1), end + Duration::days(1))
    } else {
        (start, end)
    }
}

/// Titles, axis labels and legends need a font backend; without one plotters
/// panics on the first glyph.
const DRAW_TEXT: bool = cfg!(feature = "ttf");

/// Split a series at missing values so each run is drawn as its own line.
fn value_runs(points: &[(NaiveDate, Option<f64>)]) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (date, value) in points {
        match value {
            Some(v) => current.push((*date, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Draw the figure into a PNG file, one stacked chart per panel.
pub fn render_png(figure: &Figure, path: &Path, fallback_date: NaiveDate) -> Result<()> {
    let root = BitMapBackend::new(path, (FIGURE_WIDTH, FIGURE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = if DRAW_TEXT {
        root.titled(&figure.title, ("sans-serif", 18).into_font())
            .map_err(chart_err)?
    } else {
        root
    };

    let (start, end) = pad_dates(figure.date_range().unwrap_or((fallback_date, fallback_date)));
    let date_fmt = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
    let x_label_panel = figure.x_label_panel();
    let y_label_panel = figure.y_label_panel();

    let areas = root.split_evenly((figure.panels.len(), 1));
    for (idx, (area, panel)) in areas.iter().zip(figure.panels.iter()).enumerate() {
        let (y_min, y_max) = pad_values(panel.value_range().unwrap_or((0.0, 0.0)));

        let mut builder = ChartBuilder::on(area);
        builder.margin(5);
        if DRAW_TEXT {
            builder
                .caption(&panel.title, ("sans-serif", 14).into_font())
                .x_label_area_size(if idx == x_label_panel { 35 } else { 20 })
                .y_label_area_size(if idx == y_label_panel { 55 } else { 40 });
        }
        let mut chart = builder
            .build_cartesian_2d(start..end, y_min..y_max)
            .map_err(chart_err)?;

        if DRAW_TEXT {
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(4).x_label_formatter(&date_fmt).y_labels(4);
            if idx == x_label_panel {
                mesh.x_desc(X_AXIS_LABEL);
            }
            if idx == y_label_panel {
                mesh.y_desc(Y_AXIS_LABEL);
            }
            mesh.draw().map_err(chart_err)?;
        }

        let mut labelled = false;
        for series in &panel.series {
            let color = RGBColor(series.color[0], series.color[1], series.color[2]);
            for (run_idx, run) in value_runs(&series.points).into_iter().enumerate() {
                let anno = chart
                    .draw_series(LineSeries::new(run, &color))
                    .map_err(chart_err)?;
                if DRAW_TEXT && run_idx == 0 {
                    anno.label(series.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], &color));
                    labelled = true;
                }
            }
        }

        if labelled {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(chart_err)?;
        }
    }

    root.present().map_err(chart_err)?;
    debug!("Rendered {} panels to {}", figure.panels.len(), path.display());
    Ok(())
}
