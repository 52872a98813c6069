//! `bikeshare-explorer` loads per-city bike-share trip files into an in-memory
//! [`types::TripTable`], narrows them by month and weekday, and reports travel-time, station,
//! duration and user statistics together with histogram data for plotting.
//!
//! The primary entrypoint is [`ingestion::load`], which reads one comma-delimited file with a
//! header row. Only `Start Time` is required; every other column the loader recognises becomes a
//! capability of the table's [`types::TripSchema`]:
//!
//! - `End Time`, `Trip Duration`, `Start Station`, `End Station`, `User Type`
//! - `Gender`, `Birth Year` (absent from some cities)
//!
//! Unrecognised columns (such as an unnamed leading index column) are ignored.
//!
//! ## Quick example: load, filter, aggregate
//!
//! ```no_run
//! use bikeshare_explorer::ingestion::load;
//! use bikeshare_explorer::processing::{duration_stats, filter};
//!
//! # fn main() -> Result<(), bikeshare_explorer::TripError> {
//! let table = load("chicago.csv")?;
//! let june = filter(&table, "june", "all")?;
//! let stats = duration_stats(&june)?;
//! println!("{} trips, mean {:.2} minutes", stats.trips, stats.mean_minutes);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running everything at once
//!
//! [`execution::AnalysisEngine`] runs all four statistics categories and both figures, skipping
//! categories the dataset cannot support (for example user statistics on a file without
//! `User Type`):
//!
//! ```no_run
//! use bikeshare_explorer::execution::AnalysisEngine;
//! use bikeshare_explorer::ingestion::load;
//! use bikeshare_explorer::report::{render_report, save_figure};
//!
//! # fn main() -> Result<(), bikeshare_explorer::TripError> {
//! let table = load("washington.csv")?;
//! let report = AnalysisEngine::default().run(&table)?;
//! print!("{}", render_report(&report));
//! for figure in &report.figures {
//!     save_figure(figure, std::path::Path::new("."))?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: file discovery, CSV loading and load observers
//! - [`types`]: trip records, schema capabilities and the trip table
//! - [`calendar`]: month and weekday enumerations
//! - [`processing`]: filtering, statistics, reductions and histograms
//! - [`execution`]: the analysis engine and its observers
//! - [`report`]: text rendering and figure JSON artifacts
//! - [`plot`]: PNG rendering of figures
//! - [`session`]: the interactive prompt loop used by the binary
//! - [`error`]: the crate error type

pub mod calendar;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod plot;
pub mod processing;
pub mod report;
pub mod session;
pub mod types;

pub use error::{TripError, TripResult};
