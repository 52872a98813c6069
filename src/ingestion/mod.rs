//! Loading trip files.
//!
//! Most callers should use [`load`] (from [`loader`]) which:
//!
//! - reads a trip CSV into an in-memory [`crate::types::TripTable`]
//! - converts `Start Time` into a timestamp for every row
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! The CSV parsing itself lives in [`csv`].

pub mod csv;
pub mod loader;
pub mod observability;

pub use loader::{file_names, list_csv_files, load, load_with_options, resolve_city_file, LoadOptions};
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, LogObserver,
    StdErrObserver,
};
