//! Month / weekday filtering for [`crate::types::TripTable`].
//!
//! Filter values are validated against the closed enumerations in [`crate::calendar`]. Month
//! matching uses the calendar month number of `Start Time`; day matching uses its weekday index
//! (Monday = 0). When both are set they combine with logical AND.

use std::fmt;

use crate::calendar::{accepted_names, Month, Weekday};
use crate::error::{TripError, TripResult};
use crate::types::TripTable;

/// Month dimension of a [`FilterSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    Only(Month),
}

impl MonthFilter {
    /// Parse `"all"` or a full month name (case-insensitive).
    pub fn parse(value: &str) -> TripResult<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Month::from_name(value)
            .map(Self::Only)
            .ok_or_else(|| TripError::InvalidFilter {
                dimension: "month",
                value: value.to_owned(),
                accepted: accepted_names(Month::ALL.map(Month::name)),
            })
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(m) => f.write_str(m.name()),
        }
    }
}

/// Day dimension of a [`FilterSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFilter {
    All,
    Only(Weekday),
}

impl DayFilter {
    /// Parse `"all"` or a full weekday name (case-insensitive).
    pub fn parse(value: &str) -> TripResult<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Weekday::from_name(value)
            .map(Self::Only)
            .ok_or_else(|| TripError::InvalidFilter {
                dimension: "day",
                value: value.to_owned(),
                accepted: accepted_names(Weekday::ALL.map(Weekday::name)),
            })
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(d) => f.write_str(d.name()),
        }
    }
}

/// A validated month/day filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterSpec {
    /// The spec that keeps every row.
    pub fn all() -> Self {
        Self {
            month: MonthFilter::All,
            day: DayFilter::All,
        }
    }

    /// Validate user-supplied month and day names. The month is checked first.
    pub fn parse(month: &str, day: &str) -> TripResult<Self> {
        Ok(Self {
            month: MonthFilter::parse(month)?,
            day: DayFilter::parse(day)?,
        })
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month={}, day={}", self.month, self.day)
    }
}

/// Keep rows whose start month matches. May return an empty table.
pub fn by_month(table: &TripTable, month: MonthFilter) -> TripTable {
    match month {
        MonthFilter::All => table.clone(),
        MonthFilter::Only(m) => {
            let wanted = m.number();
            table.filter_rows(|r| r.month().number() == wanted)
        }
    }
}

/// Keep rows whose start weekday matches. May return an empty table.
pub fn by_day(table: &TripTable, day: DayFilter) -> TripTable {
    match day {
        DayFilter::All => table.clone(),
        DayFilter::Only(d) => {
            let wanted = d.index();
            table.filter_rows(|r| r.weekday().index() == wanted)
        }
    }
}

/// Apply a validated spec. Fails with [`TripError::EmptyResult`] if no row matches.
pub fn filter_trips(table: &TripTable, spec: &FilterSpec) -> TripResult<TripTable> {
    let out = by_day(&by_month(table, spec.month), spec.day);
    if out.is_empty() {
        return Err(TripError::EmptyResult {
            filters: spec.to_string(),
        });
    }
    log::debug!(
        "filter {spec} kept {} of {} trips",
        out.row_count(),
        table.row_count()
    );
    Ok(out)
}

/// Validate `month` and `day` names, then filter.
pub fn filter(table: &TripTable, month: &str, day: &str) -> TripResult<TripTable> {
    let spec = FilterSpec::parse(month, day)?;
    filter_trips(table, &spec)
}
