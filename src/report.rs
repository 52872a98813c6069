//! Text rendering of statistics and histograms, and saving figures for an external renderer.

use std::fmt::{self, Write as _};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::TripResult;
use crate::execution::{AnalysisReport, Stage};
use crate::processing::{
    Availability, BucketRange, DurationStats, Figure, Histogram, StationStats, TimeStats, UserStats,
};
use crate::types::{Column, TripRecord, TripTable};

const RULE_WIDTH: usize = 40;

impl fmt::Display for TimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The most common month is: {}", self.most_common_month.value)?;
        writeln!(f, "The most common day of week is: {}", self.most_common_day.value)?;
        write!(f, "The most common start hour is: {}", self.most_common_hour.value)
    }
}

impl fmt::Display for StationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "The most commonly used start station is: {} ({} trips)",
            self.most_common_start.value, self.most_common_start.count
        )?;
        writeln!(
            f,
            "The most commonly used end station is: {} ({} trips)",
            self.most_common_end.value, self.most_common_end.count
        )?;
        write!(
            f,
            "The most common start to end station is: {} ({} trips)",
            self.most_common_trip.value, self.most_common_trip.count
        )
    }
}

impl fmt::Display for DurationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total travel time: {:.2} days", self.total_days)?;
        writeln!(f, "Mean travel time: {:.2} minutes", self.mean_minutes)?;
        writeln!(
            f,
            "Standard deviation of travel time: {:.2} minutes",
            self.std_dev_minutes
        )?;
        write!(
            f,
            "Shortest / longest trip: {:.2} / {:.2} minutes",
            self.shortest_minutes, self.longest_minutes
        )
    }
}

impl fmt::Display for UserStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Counts of user types:")?;
        write_counts(f, &self.user_types)?;

        match &self.gender {
            Availability::Available(counts) => {
                writeln!(f, "Counts of gender:")?;
                write_counts(f, counts)?;
            }
            Availability::Unavailable => writeln!(f, "Counts of gender: Not available")?,
        }

        match &self.birth_year {
            Availability::Available(years) => {
                writeln!(f, "Earliest year of birth: {}", years.earliest)?;
                writeln!(f, "Most recent year of birth: {}", years.most_recent)?;
                write!(f, "Most common year of birth: {}", years.most_common.value)
            }
            Availability::Unavailable => write!(f, "No Birth Year data available."),
        }
    }
}

/// `fmt` pads by `char`, so widths are measured in chars, not bytes.
fn text_width(s: &str) -> usize {
    s.chars().count()
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &[(String, usize)]) -> fmt::Result {
    let width = counts.iter().map(|(k, _)| text_width(k)).max().unwrap_or(0);
    for (k, n) in counts {
        writeln!(f, "  {k:<width$}  {n}")?;
    }
    Ok(())
}

/// Render every section of an analysis run the way the interactive tool prints it.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let sections: [(Stage, Option<String>); 4] = [
        (Stage::TimeStats, report.time.as_ref().map(ToString::to_string)),
        (Stage::StationStats, report.stations.as_ref().map(ToString::to_string)),
        (Stage::DurationStats, report.durations.as_ref().map(ToString::to_string)),
        (Stage::UserStats, report.users.as_ref().map(ToString::to_string)),
    ];

    for (stage, body) in sections {
        let _ = writeln!(out, "\n{}\n", stage.banner());
        match (body, report.skip_reason(stage)) {
            (Some(body), _) => {
                let _ = writeln!(out, "{body}");
            }
            (None, Some(reason)) => {
                let _ = writeln!(out, "Skipped: {reason}");
            }
            (None, None) => {}
        }
        if let Some(elapsed) = report.elapsed(stage) {
            let _ = writeln!(out, "\nThis took {:.1} ms.", elapsed.as_secs_f64() * 1000.0);
        }
        let _ = writeln!(out, "{}", "_".repeat(RULE_WIDTH));
    }
    out
}

/// Horizontal bar chart of `histogram`, bars scaled to at most `width` characters.
pub fn render_histogram(histogram: &Histogram, width: usize) -> String {
    let labels: Vec<String> = histogram
        .buckets
        .iter()
        .map(|b| match &b.range {
            BucketRange::Numeric { lower, upper } => format!("{lower:.1} - {upper:.1}"),
            BucketRange::Category { label } => label.clone(),
        })
        .collect();
    let label_width = labels.iter().map(|l| text_width(l)).max().unwrap_or(0);
    let max = histogram.buckets.iter().map(|b| b.count).max().unwrap_or(0);

    let mut out = String::new();
    for (label, bucket) in labels.iter().zip(&histogram.buckets) {
        let bar = if max == 0 {
            0
        } else {
            // Round up so non-empty buckets stay visible.
            (bucket.count * width).div_ceil(max)
        };
        let _ = writeln!(
            out,
            "{label:>label_width$} | {} {}",
            "#".repeat(bar),
            bucket.count
        );
    }
    out
}

/// Render every panel of a figure with its title.
pub fn render_figure(figure: &Figure, width: usize) -> String {
    let mut out = String::new();
    for panel in &figure.panels {
        let _ = writeln!(out, "{} ({} vs {})", panel.title, panel.y_label, panel.x_label);
        out.push_str(&render_histogram(&panel.histogram, width));
        out.push('\n');
    }
    out
}

/// Up to `n` records starting at `offset`, one per line, with a header of the present columns.
pub fn raw_rows(table: &TripTable, offset: usize, n: usize) -> String {
    let columns: Vec<Column> = table.schema.columns().collect();
    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    let _ = writeln!(out, "{:>6}  {}", "row", header.join(" | "));

    for (i, record) in table.records.iter().enumerate().skip(offset).take(n) {
        let cells: Vec<String> = columns.iter().map(|c| cell(record, *c)).collect();
        let _ = writeln!(out, "{i:>6}  {}", cells.join(" | "));
    }
    out
}

fn cell(r: &TripRecord, column: Column) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    match column {
        Column::StartTime => r.start_time.to_string(),
        Column::EndTime => r.end_time.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
        Column::TripDuration => r
            .trip_duration
            .map(|d| format!("{d}"))
            .unwrap_or_else(|| "-".to_string()),
        Column::StartStation => text(&r.start_station),
        Column::EndStation => text(&r.end_station),
        Column::UserType => text(&r.user_type),
        Column::Gender => text(&r.gender),
        Column::BirthYear => r
            .birth_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// `true` if a file can be created in `dir`.
pub fn is_directory_writable(dir: &Path) -> bool {
    let probe = dir.join(".bikeshare-write-probe");
    let created = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe)
        .is_ok();
    if created {
        let _ = fs::remove_file(&probe);
    }
    created
}

/// `dir/file_name` if `dir` is writable, otherwise the same name in the system temp directory.
pub fn safe_save_path(dir: &Path, file_name: &str) -> PathBuf {
    if is_directory_writable(dir) {
        dir.join(file_name)
    } else {
        log::warn!(
            "{} is not writable; saving {file_name} to the temp directory",
            dir.display()
        );
        std::env::temp_dir().join(file_name)
    }
}

/// Write `figure` as pretty JSON to `<dir>/<name>.json` (or the temp-directory fallback).
///
/// Returns the path actually written.
pub fn save_figure(figure: &Figure, dir: &Path) -> TripResult<PathBuf> {
    let path = safe_save_path(dir, &format!("{}.json", figure.name));
    let json = serde_json::to_string_pretty(figure)?;
    fs::write(&path, json)?;
    log::info!("saved {} to {}", figure.name, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{raw_rows, render_histogram, safe_save_path};
    use crate::processing::{Availability, Bucket, BucketRange, Histogram, HistogramColumn, UserStats};
    use crate::types::{Column, TripRecord, TripSchema, TripTable};
    use chrono::NaiveDate;

    #[test]
    fn histogram_bars_scale_to_width() {
        let h = Histogram {
            column: HistogramColumn::UserType,
            buckets: vec![
                Bucket {
                    range: BucketRange::Category {
                        label: "Customer".to_string(),
                    },
                    count: 1,
                },
                Bucket {
                    range: BucketRange::Category {
                        label: "Subscriber".to_string(),
                    },
                    count: 4,
                },
            ],
        };
        let text = render_histogram(&h, 8);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  Customer | ## 1");
        assert_eq!(lines[1], "Subscriber | ######## 4");
    }

    #[test]
    fn count_columns_align_with_accented_keys() {
        let stats = UserStats {
            user_types: vec![
                ("Abonné".to_string(), 7),
                ("Member".to_string(), 12),
            ],
            gender: Availability::Unavailable,
            birth_year: Availability::Unavailable,
        };
        let text = stats.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "  Abonné  7");
        assert_eq!(lines[2], "  Member  12");
    }

    #[test]
    fn histogram_labels_align_by_character() {
        let bucket = |label: &str, count| Bucket {
            range: BucketRange::Category {
                label: label.to_string(),
            },
            count,
        };
        let h = Histogram {
            column: HistogramColumn::UserType,
            buckets: vec![bucket("Étés", 2), bucket("Hiver", 2)],
        };
        let text = render_histogram(&h, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " Étés | ## 2");
        assert_eq!(lines[1], "Hiver | ## 2");
    }

    #[test]
    fn raw_rows_pages_from_offset() {
        let records = (1..=7)
            .map(|d| TripRecord {
                trip_duration: Some(f64::from(d) * 60.0),
                ..TripRecord::new(
                    NaiveDate::from_ymd_opt(2017, 1, d)
                        .unwrap()
                        .and_hms_opt(9, 0, 0)
                        .unwrap(),
                )
            })
            .collect();
        let table = TripTable::new(TripSchema::new([Column::TripDuration]), records);

        let page = raw_rows(&table, 5, 5);
        let lines: Vec<&str> = page.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Start Time | Trip Duration"));
        assert!(lines[1].contains("2017-01-06 09:00:00 | 360"));
    }

    #[test]
    fn writable_directory_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(safe_save_path(dir.path(), "x.json"), dir.path().join("x.json"));
    }

    #[test]
    fn missing_directory_falls_back_to_temp() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        assert_eq!(
            safe_save_path(&gone, "x.json"),
            std::env::temp_dir().join("x.json")
        );
    }
}
