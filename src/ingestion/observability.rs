use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TripError;
use crate::types::{Column, TripSchema};

/// How bad a failed load is; alert thresholds compare against it.
///
/// Bad content in an otherwise readable file is an [`LoadSeverity::Error`]: the user can pick
/// another file. A file that cannot be read at all is [`LoadSeverity::Critical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    Error,
    Critical,
}

impl LoadSeverity {
    /// Severity assigned to a failed load.
    pub fn for_error(e: &TripError) -> Self {
        match e {
            TripError::NotFound { .. } | TripError::Io(_) => LoadSeverity::Critical,
            TripError::Csv(err) if matches!(err.kind(), ::csv::ErrorKind::Io(_)) => {
                LoadSeverity::Critical
            }
            _ => LoadSeverity::Error,
        }
    }

    /// `log` level used when reporting a failure of this severity.
    pub fn level(self) -> log::Level {
        match self {
            LoadSeverity::Error => log::Level::Warn,
            LoadSeverity::Critical => log::Level::Error,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoadSeverity::Error => "error",
            LoadSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for LoadSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// The source file path.
    pub path: PathBuf,
}

/// Stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of loaded trips.
    pub rows: usize,
    /// Columns found in the file.
    pub schema: TripSchema,
}

/// Observer interface for load outcomes.
pub trait LoadObserver: Send + Sync {
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &TripError) {}

    /// Called, after [`Self::on_failure`], when the severity meets the configured alert threshold.
    ///
    /// Defaults to reporting the failure a second time.
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        self.on_failure(ctx, severity, error)
    }
}

/// One load outcome, rendered as a single `key=value` line by the stderr and file observers.
enum LoadEvent<'a> {
    Loaded(LoadStats),
    Failed(LoadSeverity, &'a TripError),
    Alert(LoadSeverity, &'a TripError),
}

struct EventLine<'a> {
    path: &'a Path,
    event: LoadEvent<'a>,
}

impl<'a> EventLine<'a> {
    fn loaded(ctx: &'a LoadContext, stats: LoadStats) -> Self {
        Self {
            path: &ctx.path,
            event: LoadEvent::Loaded(stats),
        }
    }

    fn failed(ctx: &'a LoadContext, severity: LoadSeverity, error: &'a TripError) -> Self {
        Self {
            path: &ctx.path,
            event: LoadEvent::Failed(severity, error),
        }
    }

    fn alert(ctx: &'a LoadContext, severity: LoadSeverity, error: &'a TripError) -> Self {
        Self {
            path: &ctx.path,
            event: LoadEvent::Alert(severity, error),
        }
    }
}

impl fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.event {
            LoadEvent::Loaded(stats) => write!(
                f,
                "loaded path={path} trips={} missing={}",
                stats.rows,
                MissingColumns(&stats.schema)
            ),
            LoadEvent::Failed(severity, error) => {
                write!(f, "failed path={path} severity={severity} error={error}")
            }
            LoadEvent::Alert(severity, error) => {
                write!(f, "ALERT path={path} severity={severity} error={error}")
            }
        }
    }
}

/// Headers of the recognised columns a file lacks, `|`-separated, or `none`.
struct MissingColumns<'a>(&'a TripSchema);

impl fmt::Display for MissingColumns<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut missing = self.0.missing().map(Column::header).peekable();
        if missing.peek().is_none() {
            return f.write_str("none");
        }
        for (i, header) in missing.enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(header)?;
        }
        Ok(())
    }
}

/// Forwards every callback to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }

    fn each(&self, f: impl Fn(&dyn LoadObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Prints load events to stderr, prefixed with `[load]`.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl LoadObserver for StdErrObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!("[load] {}", EventLine::loaded(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        eprintln!("[load] {}", EventLine::failed(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        eprintln!("[load] {}", EventLine::alert(ctx, severity, error));
    }
}

/// Forwards load events to the `log` facade at the level of their severity.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        log::info!(
            "loaded {} trips from {} (missing columns: {})",
            stats.rows,
            ctx.path.display(),
            MissingColumns(&stats.schema)
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        log::log!(
            severity.level(),
            "could not load {} ({severity}): {error}",
            ctx.path.display()
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        log::error!("ALERT: {} is unusable ({severity}): {error}", ctx.path.display());
    }
}

/// Appends timestamped load events to a file.
///
/// Writing is best-effort: a log file that cannot be opened never fails the load itself.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    writer: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: Mutex::new(()),
        }
    }
}

impl FileObserver {
    fn append(&self, line: EventLine<'_>) {
        let Ok(_held) = self.writer.lock() else {
            return;
        };
        let opened = OpenOptions::new().create(true).append(true).open(&self.path);
        match opened {
            Ok(mut file) => {
                let ts = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                if let Err(e) = writeln!(file, "{ts} {line}") {
                    log::debug!("load log {} not written: {e}", self.path.display());
                }
            }
            Err(e) => log::debug!("load log {} not opened: {e}", self.path.display()),
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append(EventLine::loaded(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        self.append(EventLine::failed(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &TripError) {
        self.append(EventLine::alert(ctx, severity, error));
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadSeverity, MissingColumns};
    use crate::types::{Column, TripSchema};
    use crate::TripError;

    #[test]
    fn unreadable_files_are_critical() {
        let missing = TripError::NotFound {
            path: "nope.csv".into(),
        };
        let bad_cell = TripError::SchemaMismatch {
            message: "no Start Time".to_string(),
        };
        assert_eq!(LoadSeverity::for_error(&missing), LoadSeverity::Critical);
        assert_eq!(LoadSeverity::for_error(&bad_cell), LoadSeverity::Error);
        assert!(LoadSeverity::Error < LoadSeverity::Critical);
        assert_eq!(LoadSeverity::Error.level(), log::Level::Warn);
    }

    #[test]
    fn missing_columns_render_as_pipe_list() {
        assert_eq!(MissingColumns(&TripSchema::full()).to_string(), "none");
        let schema = TripSchema::new([Column::TripDuration, Column::UserType]);
        let text = MissingColumns(&schema).to_string();
        assert!(text.starts_with("End Time|Start Station"));
        assert!(text.ends_with("Gender|Birth Year"));
    }
}
