//! Frequency distributions over trip-table columns.
//!
//! [`histogram`] only buckets data. Drawing the buckets is left to whoever consumes the
//! serialized [`Figure`]s.

use serde::Serialize;

use crate::calendar::{Month, Weekday};
use crate::error::{TripError, TripResult};
use crate::types::{Column, TripRecord, TripTable};

use super::aggregate::DurationStats;

/// Buckets in the duration histogram.
pub const DURATION_BUCKETS: usize = 30;

/// Columns (source or derived from `Start Time`) that can be bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramColumn {
    Month,
    Weekday,
    Hour,
    TripDuration,
    BirthYear,
    UserType,
    Gender,
}

impl HistogramColumn {
    /// The source column the values come from.
    pub fn source(self) -> Column {
        match self {
            HistogramColumn::Month | HistogramColumn::Weekday | HistogramColumn::Hour => {
                Column::StartTime
            }
            HistogramColumn::TripDuration => Column::TripDuration,
            HistogramColumn::BirthYear => Column::BirthYear,
            HistogramColumn::UserType => Column::UserType,
            HistogramColumn::Gender => Column::Gender,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HistogramColumn::Month => "Month",
            HistogramColumn::Weekday => "Day of Week",
            HistogramColumn::Hour => "Hour of Day",
            HistogramColumn::TripDuration => "Trip Duration (seconds)",
            HistogramColumn::BirthYear => "Birth Year",
            HistogramColumn::UserType => "User Type",
            HistogramColumn::Gender => "Gender",
        }
    }

    fn numeric_value(self, r: &TripRecord) -> Option<f64> {
        match self {
            HistogramColumn::Month => Some(f64::from(r.month().number())),
            HistogramColumn::Weekday => Some(f64::from(r.weekday().index())),
            HistogramColumn::Hour => Some(f64::from(r.hour())),
            HistogramColumn::TripDuration => r.trip_duration,
            HistogramColumn::BirthYear => r.birth_year.map(f64::from),
            HistogramColumn::UserType | HistogramColumn::Gender => None,
        }
    }

    fn is_numeric(self) -> bool {
        !matches!(self, HistogramColumn::UserType | HistogramColumn::Gender)
    }
}

/// How values are assigned to buckets.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketSpec {
    /// `n` equal-width buckets over the observed `[min, max]`.
    Count(usize),
    /// Explicit, strictly increasing edges. Out-of-range values land in the first/last bucket.
    Edges(Vec<f64>),
    /// One bucket per category.
    Categorical,
}

impl BucketSpec {
    /// `buckets` equal-width buckets from `start` to `stop`.
    pub fn linspace(start: f64, stop: f64, buckets: usize) -> Self {
        BucketSpec::Edges(linspace_edges(start, stop, buckets))
    }

    /// Edges from 0 to `mean + 3 × std dev` seconds, so long outliers collapse into the last
    /// bucket. Falls back to [`BucketSpec::Count`] when that range is empty.
    pub fn duration(stats: &DurationStats) -> Self {
        let upper = stats.mean_seconds() + 3.0 * stats.std_dev_seconds();
        if upper > 0.0 && upper.is_finite() {
            Self::linspace(0.0, upper, DURATION_BUCKETS)
        } else {
            BucketSpec::Count(DURATION_BUCKETS)
        }
    }
}

/// The range a bucket covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BucketRange {
    /// `[lower, upper)`; the last bucket of a histogram is closed on the right.
    Numeric { lower: f64, upper: f64 },
    Category { label: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub range: BucketRange,
    pub count: usize,
}

/// Ordered buckets for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: HistogramColumn,
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    /// Sum of all bucket counts.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Bucket `column` of `table` according to `spec`.
pub fn histogram(table: &TripTable, column: HistogramColumn, spec: &BucketSpec) -> TripResult<Histogram> {
    table.schema.require(column.source())?;

    let buckets = match spec {
        BucketSpec::Categorical => categorical_buckets(table, column)?,
        BucketSpec::Count(n) => {
            let values = numeric_values(table, column)?;
            let edges = observed_edges(&values, *n)?;
            numeric_buckets(&values, &edges)
        }
        BucketSpec::Edges(edges) => {
            validate_edges(edges)?;
            let values = numeric_values(table, column)?;
            numeric_buckets(&values, edges)
        }
    };

    Ok(Histogram { column, buckets })
}

fn numeric_values(table: &TripTable, column: HistogramColumn) -> TripResult<Vec<f64>> {
    if !column.is_numeric() {
        return Err(TripError::InvalidHistogram {
            message: format!("'{}' is categorical; use BucketSpec::Categorical", column.label()),
        });
    }
    Ok(table
        .records
        .iter()
        .filter_map(|r| column.numeric_value(r))
        .collect())
}

fn observed_edges(values: &[f64], buckets: usize) -> TripResult<Vec<f64>> {
    if buckets == 0 {
        return Err(TripError::InvalidHistogram {
            message: "bucket count must be > 0".to_string(),
        });
    }
    if values.is_empty() {
        return Err(TripError::InsufficientData {
            statistic: "histogram",
            required: 1,
            actual: 0,
        });
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    Ok(linspace_edges(lo, hi, buckets))
}

// `buckets + 1` edges; the last one is exactly `stop`.
fn linspace_edges(start: f64, stop: f64, buckets: usize) -> Vec<f64> {
    let step = (stop - start) / buckets as f64;
    let mut edges: Vec<f64> = (0..buckets).map(|i| start + step * i as f64).collect();
    edges.push(stop);
    edges
}

fn validate_edges(edges: &[f64]) -> TripResult<()> {
    if edges.len() < 2 {
        return Err(TripError::InvalidHistogram {
            message: format!("need at least 2 edges, got {}", edges.len()),
        });
    }
    if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(TripError::InvalidHistogram {
            message: "edges must be finite and strictly increasing".to_string(),
        });
    }
    Ok(())
}

fn numeric_buckets(values: &[f64], edges: &[f64]) -> Vec<Bucket> {
    let n = edges.len() - 1;
    let mut counts = vec![0usize; n];
    for v in values {
        // Index of the last edge <= v, clamped into [0, n - 1].
        let idx = edges.partition_point(|e| e <= v).saturating_sub(1).min(n - 1);
        counts[idx] += 1;
    }
    edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| Bucket {
            range: BucketRange::Numeric {
                lower: w[0],
                upper: w[1],
            },
            count,
        })
        .collect()
}

fn categorical_buckets(table: &TripTable, column: HistogramColumn) -> TripResult<Vec<Bucket>> {
    let labelled: Vec<(String, usize)> = match column {
        HistogramColumn::Month => Month::ALL
            .iter()
            .map(|m| {
                let n = table.records.iter().filter(|r| r.month() == *m).count();
                (m.short_label().to_string(), n)
            })
            .collect(),
        HistogramColumn::Weekday => Weekday::ALL
            .iter()
            .map(|d| {
                let n = table.records.iter().filter(|r| r.weekday() == *d).count();
                (d.to_string(), n)
            })
            .collect(),
        HistogramColumn::Hour => (0..24)
            .map(|h| {
                let n = table.records.iter().filter(|r| r.hour() == h).count();
                (format!("{h}:00"), n)
            })
            .collect(),
        HistogramColumn::BirthYear => {
            distinct_counts(table.records.iter().filter_map(|r| r.birth_year))
                .into_iter()
                .map(|(y, n)| (y.to_string(), n))
                .collect()
        }
        HistogramColumn::UserType => {
            distinct_counts(table.records.iter().filter_map(|r| r.user_type.clone()))
        }
        HistogramColumn::Gender => {
            distinct_counts(table.records.iter().filter_map(|r| r.gender.clone()))
        }
        HistogramColumn::TripDuration => {
            return Err(TripError::InvalidHistogram {
                message: "trip duration is continuous; use a bucket count or edges".to_string(),
            });
        }
    };

    Ok(labelled
        .into_iter()
        .map(|(label, count)| Bucket {
            range: BucketRange::Category { label },
            count,
        })
        .collect())
}

// Distinct values in ascending order with their counts.
fn distinct_counts<T: Ord>(values: impl Iterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0usize) += 1;
    }
    counts.into_iter().collect()
}

/// One histogram plus its axis titles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub histogram: Histogram,
}

/// A named group of panels, saved as one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub name: &'static str,
    pub panels: Vec<Panel>,
}

/// Month, weekday and hour distributions (`time_stats`).
pub fn time_figure(table: &TripTable) -> TripResult<Figure> {
    let panel = |title: &'static str, column: HistogramColumn, spec: BucketSpec| -> TripResult<Panel> {
        Ok(Panel {
            title,
            x_label: column.label(),
            y_label: "Frequency",
            histogram: histogram(table, column, &spec)?,
        })
    };

    Ok(Figure {
        name: "time_stats",
        panels: vec![
            panel("Months Histogram", HistogramColumn::Month, BucketSpec::Count(12))?,
            panel("Days of Week Histogram", HistogramColumn::Weekday, BucketSpec::Categorical)?,
            panel("Hours Histogram", HistogramColumn::Hour, BucketSpec::Count(24))?,
        ],
    })
}

/// Trip duration distribution (`trip_duration_stats`) using [`BucketSpec::duration`].
pub fn duration_figure(table: &TripTable, stats: &DurationStats) -> TripResult<Figure> {
    let column = HistogramColumn::TripDuration;
    Ok(Figure {
        name: "trip_duration_stats",
        panels: vec![Panel {
            title: "Trip Duration Histogram",
            x_label: column.label(),
            y_label: "Frequency",
            histogram: histogram(table, column, &BucketSpec::duration(stats))?,
        }],
    })
}
