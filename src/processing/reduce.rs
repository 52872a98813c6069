//! Reductions over [`crate::types::TripTable`] columns.
//!
//! Missing values (blank cells) are skipped by every reduction, so a column that is present but
//! partly blank still reduces over its filled cells.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{TripError, TripResult};
use crate::types::{Column, TripTable};

/// Built-in numeric reductions over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Number of non-missing values.
    Count,
    /// Sum of values (`0.0` when there are none).
    Sum,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Arithmetic mean.
    Mean,
    /// Sample standard deviation (n − 1 denominator).
    StdDev,
}

impl ReduceOp {
    pub fn name(self) -> &'static str {
        match self {
            ReduceOp::Count => "count",
            ReduceOp::Sum => "sum",
            ReduceOp::Min => "min",
            ReduceOp::Max => "max",
            ReduceOp::Mean => "mean",
            ReduceOp::StdDev => "standard deviation",
        }
    }
}

/// The most frequent value of a column and how many rows carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mode<T> {
    pub value: T,
    pub count: usize,
}

/// Most frequent value; ties go to the smallest value in `T`'s ordering.
///
/// Returns `None` for an empty input.
pub fn mode<T, I>(values: I) -> Option<Mode<T>>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    // Ascending iteration + strict `>` keeps the smallest value among ties.
    let mut best: Option<Mode<T>> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|b| count > b.count) {
            best = Some(Mode { value, count });
        }
    }
    best
}

/// Occurrences per distinct value, sorted by descending count then ascending value.
pub fn value_counts<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut out: Vec<(T, usize)> = counts.into_iter().collect();
    // Stable sort keeps the ascending-value order among equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Non-missing values of a numeric column (`Trip Duration` or `Birth Year`), in row order.
pub fn numeric_values(table: &TripTable, column: Column) -> TripResult<Vec<f64>> {
    table.schema.require(column)?;
    match column {
        Column::TripDuration => Ok(table.records.iter().filter_map(|r| r.trip_duration).collect()),
        Column::BirthYear => Ok(table
            .records
            .iter()
            .filter_map(|r| r.birth_year.map(f64::from))
            .collect()),
        other => Err(TripError::SchemaMismatch {
            message: format!("column '{other}' is not numeric"),
        }),
    }
}

/// Reduce a numeric column using a built-in [`ReduceOp`].
///
/// - Fails with [`TripError::MissingColumn`] if `column` is absent from the table's schema.
/// - `Min`/`Max`/`Mean` need at least one value and `StdDev` at least two; otherwise
///   [`TripError::InsufficientData`].
pub fn reduce(table: &TripTable, column: Column, op: ReduceOp) -> TripResult<f64> {
    let values = numeric_values(table, column)?;
    reduce_values(&values, op)
}

/// Apply `op` to a slice of values.
pub fn reduce_values(values: &[f64], op: ReduceOp) -> TripResult<f64> {
    let n = values.len();
    let need = |required: usize| {
        if n < required {
            Err(TripError::InsufficientData {
                statistic: op.name(),
                required,
                actual: n,
            })
        } else {
            Ok(())
        }
    };

    match op {
        ReduceOp::Count => Ok(n as f64),
        ReduceOp::Sum => Ok(values.iter().sum()),
        ReduceOp::Min => {
            need(1)?;
            Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
        }
        ReduceOp::Max => {
            need(1)?;
            Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        }
        ReduceOp::Mean => {
            need(1)?;
            Ok(values.iter().sum::<f64>() / n as f64)
        }
        ReduceOp::StdDev => {
            need(2)?;
            let mean = values.iter().sum::<f64>() / n as f64;
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Ok((squares / (n - 1) as f64).sqrt())
        }
    }
}
