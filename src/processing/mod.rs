//! In-memory trip-table processing.
//!
//! The processing layer operates on [`crate::types::TripTable`] values produced by ingestion.
//! Every operation takes the table by reference and returns a new value.
//!
//! - [`filter()`]: month / weekday narrowing
//! - [`aggregate`]: time, station, duration and user statistics
//! - [`histogram()`]: bucketed frequency distributions
//! - [`reduce()`]: numeric column reductions and the shared mode helper
//!
//! ## Example: filter → aggregate
//!
//! ```rust
//! use bikeshare_explorer::processing::{filter, time_stats};
//! use bikeshare_explorer::types::{TripRecord, TripSchema, TripTable};
//! use chrono::NaiveDate;
//!
//! let at = |m, d, h| {
//!     TripRecord::new(NaiveDate::from_ymd_opt(2017, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap())
//! };
//! let table = TripTable::new(
//!     TripSchema::full(),
//!     vec![at(3, 3, 8), at(3, 10, 17), at(3, 17, 8), at(4, 7, 8)],
//! );
//!
//! // March Fridays only.
//! let fridays = filter(&table, "march", "friday").unwrap();
//! assert_eq!(fridays.row_count(), 3);
//!
//! let stats = time_stats(&fridays).unwrap();
//! assert_eq!(stats.most_common_hour.value, 8);
//! ```

pub mod aggregate;
pub mod filter;
pub mod histogram;
pub mod reduce;

pub use aggregate::{
    duration_stats, station_stats, time_stats, user_stats, Availability, BirthYearStats, DurationStats,
    StationStats, TimeStats, UserStats,
};
pub use filter::{by_day, by_month, filter, filter_trips, DayFilter, FilterSpec, MonthFilter};
pub use histogram::{
    duration_figure, histogram, time_figure, Bucket, BucketRange, BucketSpec, Figure, Histogram,
    HistogramColumn, Panel,
};
pub use reduce::{mode, reduce, value_counts, Mode, ReduceOp};
