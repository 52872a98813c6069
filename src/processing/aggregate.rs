//! Per-category statistics: time of travel, stations, trip durations and users.
//!
//! Each function takes a non-empty [`TripTable`] (the filter step guarantees this) and returns
//! an immutable statistics value. A category whose required column is absent fails with
//! [`TripError::MissingColumn`]; callers are expected to skip it and carry on.

use serde::Serialize;

use crate::calendar::{Month, Weekday};
use crate::error::{TripError, TripResult};
use crate::types::{Column, TripTable};

use super::reduce::{self, mode, value_counts, Mode, ReduceOp};

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStats {
    pub most_common_month: Mode<Month>,
    pub most_common_day: Mode<Weekday>,
    /// Start hour, 0..=23.
    pub most_common_hour: Mode<u32>,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub most_common_start: Mode<String>,
    pub most_common_end: Mode<String>,
    /// Most frequent `"<start> to <end>"` pairing.
    pub most_common_trip: Mode<String>,
}

/// Total and average trip duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    /// Trips with a duration value.
    pub trips: usize,
    pub total_days: f64,
    pub mean_minutes: f64,
    /// Sample standard deviation.
    pub std_dev_minutes: f64,
    pub shortest_minutes: f64,
    pub longest_minutes: f64,
}

impl DurationStats {
    pub fn mean_seconds(&self) -> f64 {
        self.mean_minutes * SECONDS_PER_MINUTE
    }

    pub fn std_dev_seconds(&self) -> f64 {
        self.std_dev_minutes * SECONDS_PER_MINUTE
    }
}

/// A statistic that depends on an optional column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Availability<T> {
    Available(T),
    Unavailable,
}

impl<T> Availability<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Availability::Available(v) => Some(v),
            Availability::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }
}

/// Earliest, most recent and most common birth year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: Mode<i32>,
}

/// Bike-share user breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    /// Rows per user type, descending by count.
    pub user_types: Vec<(String, usize)>,
    /// Rows per gender, descending by count.
    pub gender: Availability<Vec<(String, usize)>>,
    pub birth_year: Availability<BirthYearStats>,
}

/// Most common month, weekday and start hour.
pub fn time_stats(table: &TripTable) -> TripResult<TimeStats> {
    table.schema.require(Column::StartTime)?;
    Ok(TimeStats {
        most_common_month: require_mode("month", table.records.iter().map(|r| r.month()))?,
        most_common_day: require_mode("weekday", table.records.iter().map(|r| r.weekday()))?,
        most_common_hour: require_mode("start hour", table.records.iter().map(|r| r.hour()))?,
    })
}

/// Most common start station, end station and start-to-end trip.
pub fn station_stats(table: &TripTable) -> TripResult<StationStats> {
    table.schema.require(Column::StartStation)?;
    table.schema.require(Column::EndStation)?;

    let starts = table.records.iter().filter_map(|r| r.start_station.as_deref());
    let ends = table.records.iter().filter_map(|r| r.end_station.as_deref());
    // Pair per row first so a trip only counts as a literal start/end pairing.
    let trips = table.records.iter().filter_map(|r| r.route());

    Ok(StationStats {
        most_common_start: owned(require_mode("start station", starts)?),
        most_common_end: owned(require_mode("end station", ends)?),
        most_common_trip: require_mode("start to end station", trips)?,
    })
}

/// Total, mean and spread of trip duration.
pub fn duration_stats(table: &TripTable) -> TripResult<DurationStats> {
    let seconds = reduce::numeric_values(table, Column::TripDuration)?;

    let std_dev = reduce::reduce_values(&seconds, ReduceOp::StdDev)?;
    let total = reduce::reduce_values(&seconds, ReduceOp::Sum)?;
    let mean = reduce::reduce_values(&seconds, ReduceOp::Mean)?;
    let shortest = reduce::reduce_values(&seconds, ReduceOp::Min)?;
    let longest = reduce::reduce_values(&seconds, ReduceOp::Max)?;

    Ok(DurationStats {
        trips: seconds.len(),
        total_days: total / SECONDS_PER_DAY,
        mean_minutes: mean / SECONDS_PER_MINUTE,
        std_dev_minutes: std_dev / SECONDS_PER_MINUTE,
        shortest_minutes: shortest / SECONDS_PER_MINUTE,
        longest_minutes: longest / SECONDS_PER_MINUTE,
    })
}

/// User type counts, plus gender and birth-year statistics where the dataset has them.
pub fn user_stats(table: &TripTable) -> TripResult<UserStats> {
    table.schema.require(Column::UserType)?;

    let user_types = owned_counts(value_counts(
        table.records.iter().filter_map(|r| r.user_type.as_deref()),
    ));

    let gender = if table.schema.has(Column::Gender) {
        Availability::Available(owned_counts(value_counts(
            table.records.iter().filter_map(|r| r.gender.as_deref()),
        )))
    } else {
        Availability::Unavailable
    };

    let birth_year = if table.schema.has(Column::BirthYear) {
        birth_year_stats(table)
    } else {
        Availability::Unavailable
    };

    Ok(UserStats {
        user_types,
        gender,
        birth_year,
    })
}

// A present-but-blank column is reported the same way as an absent one.
fn birth_year_stats(table: &TripTable) -> Availability<BirthYearStats> {
    let years: Vec<i32> = table.records.iter().filter_map(|r| r.birth_year).collect();
    let (Some(&earliest), Some(&most_recent)) = (years.iter().min(), years.iter().max()) else {
        return Availability::Unavailable;
    };
    match mode(years.iter().copied()) {
        Some(most_common) => Availability::Available(BirthYearStats {
            earliest,
            most_recent,
            most_common,
        }),
        None => Availability::Unavailable,
    }
}

fn require_mode<T, I>(statistic: &'static str, values: I) -> TripResult<Mode<T>>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    mode(values).ok_or(TripError::InsufficientData {
        statistic,
        required: 1,
        actual: 0,
    })
}

fn owned(m: Mode<&str>) -> Mode<String> {
    Mode {
        value: m.value.to_owned(),
        count: m.count,
    }
}

fn owned_counts(counts: Vec<(&str, usize)>) -> Vec<(String, usize)> {
    counts.into_iter().map(|(k, n)| (k.to_owned(), n)).collect()
}
