use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type used across loading, filtering and aggregation.
pub type TripResult<T> = Result<T, TripError>;

/// Error type returned by every fallible operation in this crate.
///
/// Loader and filter failures are fatal to the current analysis run. [`TripError::MissingColumn`]
/// is the one recoverable case: callers skip the statistics category that needed the column.
#[derive(Debug, Error)]
pub enum TripError {
    /// The source file (or a directory expected to hold source files) does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Underlying I/O error other than a missing file (e.g. permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV structure (unequal record lengths, invalid UTF-8, ...).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Figure serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input lacks a column every trip table must carry.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A cell could not be converted to the column's type.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A filter (or city selection) value lies outside its closed enumeration.
    #[error("invalid {dimension} '{value}'; expected one of: {}", accepted.join(", "))]
    InvalidFilter {
        dimension: &'static str,
        value: String,
        accepted: Vec<String>,
    },

    /// Filtering left no rows.
    #[error("no trips match the filters ({filters}); try different filters")]
    EmptyResult { filters: String },

    /// An optional column required by the requested statistic is absent from the source file.
    #[error("column '{column}' is not available in this dataset")]
    MissingColumn { column: &'static str },

    /// The statistic is undefined for the number of values available.
    #[error("{statistic} needs at least {required} value(s), found {actual}")]
    InsufficientData {
        statistic: &'static str,
        required: usize,
        actual: usize,
    },

    /// The bucket specification cannot be applied to the requested column.
    #[error("invalid histogram: {message}")]
    InvalidHistogram { message: String },

    /// A figure could not be rendered to an image.
    #[error("plot error: {message}")]
    Plot { message: String },
}

impl TripError {
    /// `true` when the caller may skip the failed category and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TripError::MissingColumn { .. })
    }
}
