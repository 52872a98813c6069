//! Loader entrypoint and city-file discovery.
//!
//! Most callers should use [`load`] or [`load_with_options`], which read a trip CSV into an
//! in-memory [`crate::types::TripTable`].
//!
//! - If a [`super::observability::LoadObserver`] is configured, success/failure/alerts are
//!   reported to it.
//! - [`list_csv_files`] and [`resolve_city_file`] turn a data directory and a user's answer into
//!   a concrete path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{TripError, TripResult};
use crate::types::TripTable;

use super::csv;
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};

/// Options controlling load behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Load a trip file with default options.
///
/// ```no_run
/// use bikeshare_explorer::ingestion::load;
///
/// # fn main() -> Result<(), bikeshare_explorer::TripError> {
/// let table = load("chicago.csv")?;
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn load(path: impl AsRef<Path>) -> TripResult<TripTable> {
    load_with_options(path, &LoadOptions::default())
}

/// Load a trip file, reporting the outcome to the configured observer.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row count and schema
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use std::sync::Arc;
///
/// use bikeshare_explorer::ingestion::{load_with_options, LoadOptions, LoadSeverity, StdErrObserver};
///
/// let opts = LoadOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     alert_at_or_above: LoadSeverity::Critical,
/// };
///
/// // Missing files are Critical and trigger `on_alert` at this threshold.
/// let _err = load_with_options("does_not_exist.csv", &opts).unwrap_err();
/// ```
pub fn load_with_options(path: impl AsRef<Path>, options: &LoadOptions) -> TripResult<TripTable> {
    let path = path.as_ref();
    let result = csv::ingest_trips_from_path(path);

    if let Some(obs) = options.observer.as_ref() {
        let ctx = LoadContext {
            path: path.to_path_buf(),
        };
        match &result {
            Ok(table) => obs.on_success(
                &ctx,
                LoadStats {
                    rows: table.row_count(),
                    schema: table.schema,
                },
            ),
            Err(e) => {
                let sev = LoadSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// List the `*.csv` files directly inside `dir`, sorted by name.
///
/// Fails with [`TripError::NotFound`] when the directory holds no CSV files.
pub fn list_csv_files(dir: impl AsRef<Path>) -> TripResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(TripError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    // Escape the directory so brackets or `?` in its name are matched literally.
    let pattern = format!("{}/*.csv", glob::Pattern::escape(&dir.to_string_lossy()));
    let entries = glob::glob(&pattern).map_err(|e| TripError::SchemaMismatch {
        message: format!("invalid data directory pattern: {e}"),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(TripError::NotFound {
            path: dir.join("*.csv"),
        });
    }
    Ok(files)
}

/// Resolve a user's city answer against the available files.
///
/// The answer is lower-cased, spaces become underscores and `.csv` is appended when missing;
/// the result must match the file name of one of `available`. An unknown city is reported with
/// the answer as typed.
pub fn resolve_city_file(input: &str, available: &[PathBuf]) -> TripResult<PathBuf> {
    let typed = input.trim();
    let mut wanted = typed.to_lowercase().replace(' ', "_");
    if !wanted.ends_with(".csv") {
        wanted.push_str(".csv");
    }

    available
        .iter()
        .find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase() == wanted)
                .unwrap_or(false)
        })
        .cloned()
        .ok_or_else(|| TripError::InvalidFilter {
            dimension: "city file",
            value: typed.to_string(),
            accepted: file_names(available),
        })
}

/// File names (without directories) of `paths`, for prompts and error messages.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}
