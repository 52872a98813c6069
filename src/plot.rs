//! PNG rendering of histogram figures with the `plotters` bitmap backend.
//!
//! Each [`Figure`] becomes one image with its panels stacked vertically, one bar per bucket.
//! Captions, axis descriptions and tick labels need a real font, so they are drawn only when the
//! crate is built with the `ttf` feature; without it the bars, axes and grid are still rendered.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{TripError, TripResult};
use crate::processing::{BucketRange, Figure, Panel};
use crate::report::safe_save_path;

const IMAGE_WIDTH: u32 = 1200;
const PANEL_HEIGHT: u32 = 400;

/// Render `figure` to `<dir>/<name>.png` (or the temp-directory fallback).
///
/// Returns the path actually written.
pub fn save_figure_png(figure: &Figure, dir: &Path) -> TripResult<PathBuf> {
    let path = safe_save_path(dir, &format!("{}.png", figure.name));
    render_figure_png(figure, &path)?;
    log::info!("rendered {} to {}", figure.name, path.display());
    Ok(path)
}

/// Render `figure` to the PNG file at `path`.
pub fn render_figure_png(figure: &Figure, path: &Path) -> TripResult<()> {
    if figure.panels.is_empty() {
        return Err(TripError::Plot {
            message: format!("figure '{}' has no panels", figure.name),
        });
    }

    let height = PANEL_HEIGHT * figure.panels.len() as u32;
    let root = BitMapBackend::new(path, (IMAGE_WIDTH, height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let areas = root.split_evenly((figure.panels.len(), 1));
    for (panel, area) in figure.panels.iter().zip(&areas) {
        draw_panel(panel, area)?;
    }

    root.present().map_err(plot_error)
}

/// Bars as `(x0, x1, count)`. Numeric buckets keep their edges; categories sit on unit slots.
fn bars(panel: &Panel) -> Vec<(f64, f64, f64)> {
    panel
        .histogram
        .buckets
        .iter()
        .enumerate()
        .map(|(i, b)| match &b.range {
            BucketRange::Numeric { lower, upper } => (*lower, *upper, b.count as f64),
            BucketRange::Category { .. } => (i as f64, i as f64 + 1.0, b.count as f64),
        })
        .collect()
}

fn category_labels(panel: &Panel) -> Vec<String> {
    panel
        .histogram
        .buckets
        .iter()
        .filter_map(|b| match &b.range {
            BucketRange::Category { label } => Some(label.clone()),
            BucketRange::Numeric { .. } => None,
        })
        .collect()
}

fn draw_panel<DB: DrawingBackend>(panel: &Panel, area: &DrawingArea<DB, Shift>) -> TripResult<()> {
    let bars = bars(panel);
    let x_min = bars.first().map(|b| b.0).unwrap_or(0.0);
    let mut x_max = bars.last().map(|b| b.1).unwrap_or(1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let y_max = bars.iter().map(|b| b.2).fold(1.0, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(area);
    chart.margin(20);
    if cfg!(feature = "ttf") {
        chart
            .caption(panel.title, ("sans-serif", 28))
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    let mut chart = chart
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(plot_error)?;

    let labels = category_labels(panel);
    let categorical = |x: &f64| {
        let slot = x.floor();
        if slot < 0.0 || *x != slot {
            return String::new();
        }
        labels.get(slot as usize).cloned().unwrap_or_default()
    };
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    if cfg!(feature = "ttf") {
        mesh.x_desc(panel.x_label).y_desc(panel.y_label);
        if !labels.is_empty() {
            mesh.x_labels(labels.len() + 1).x_label_formatter(&categorical);
        }
    } else {
        // No font to draw with; keep the grid and axes only.
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw().map_err(plot_error)?;

    chart
        .draw_series(
            bars.iter()
                .map(|&(x0, x1, count)| Rectangle::new([(x0, 0.0), (x1, count)], BLUE.mix(0.7).filled())),
        )
        .map_err(plot_error)?;

    Ok(())
}

fn plot_error<E: Display>(e: E) -> TripError {
    TripError::Plot {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{bars, render_figure_png, save_figure_png};
    use crate::processing::{
        duration_figure, duration_stats, time_figure, Bucket, BucketRange, Figure, Histogram,
        HistogramColumn, Panel,
    };
    use crate::types::{Column, TripRecord, TripSchema, TripTable};
    use crate::TripError;
    use chrono::NaiveDate;

    fn table() -> TripTable {
        let records = (1..=6)
            .map(|d| TripRecord {
                trip_duration: Some(f64::from(d) * 300.0),
                ..TripRecord::new(
                    NaiveDate::from_ymd_opt(2017, d, d)
                        .unwrap()
                        .and_hms_opt(d + 6, 0, 0)
                        .unwrap(),
                )
            })
            .collect();
        TripTable::new(TripSchema::new([Column::TripDuration]), records)
    }

    #[test]
    fn writes_png_for_both_figures() {
        let dir = tempfile::tempdir().unwrap();
        let table = table();
        let stats = duration_stats(&table).unwrap();
        let figures = [
            time_figure(&table).unwrap(),
            duration_figure(&table, &stats).unwrap(),
        ];

        for figure in &figures {
            let path = save_figure_png(figure, dir.path()).unwrap();
            assert_eq!(path, dir.path().join(format!("{}.png", figure.name)));
            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"));
        }
    }

    #[test]
    fn category_buckets_occupy_unit_slots() {
        let panel = Panel {
            title: "Users",
            x_label: "User Type",
            y_label: "Count",
            histogram: Histogram {
                column: HistogramColumn::UserType,
                buckets: ["Customer", "Subscriber"]
                    .iter()
                    .zip([2, 5])
                    .map(|(label, count)| Bucket {
                        range: BucketRange::Category {
                            label: label.to_string(),
                        },
                        count,
                    })
                    .collect(),
            },
        };
        assert_eq!(bars(&panel), vec![(0.0, 1.0, 2.0), (1.0, 2.0, 5.0)]);
    }

    #[test]
    fn empty_figure_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let figure = Figure {
            name: "empty",
            panels: Vec::new(),
        };
        let err = render_figure_png(&figure, &dir.path().join("empty.png")).unwrap_err();
        assert!(matches!(err, TripError::Plot { .. }));
    }
}
