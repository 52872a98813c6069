//! Core data model for trip tables.
//!
//! A source file is loaded into an in-memory [`TripTable`]: an ordered list of [`TripRecord`]s
//! plus a [`TripSchema`] recording which of the fixed [`Column`]s the file actually carried.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};

use crate::calendar::{Month, Weekday};

/// The fixed set of trip-record columns, in canonical header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    StartTime,
    EndTime,
    TripDuration,
    StartStation,
    EndStation,
    UserType,
    Gender,
    BirthYear,
}

impl Column {
    /// All columns in canonical header order.
    pub const ALL: [Column; 8] = [
        Column::StartTime,
        Column::EndTime,
        Column::TripDuration,
        Column::StartStation,
        Column::EndStation,
        Column::UserType,
        Column::Gender,
        Column::BirthYear,
    ];

    /// Header text as it appears in the source files.
    pub fn header(self) -> &'static str {
        match self {
            Column::StartTime => "Start Time",
            Column::EndTime => "End Time",
            Column::TripDuration => "Trip Duration",
            Column::StartStation => "Start Station",
            Column::EndStation => "End Station",
            Column::UserType => "User Type",
            Column::Gender => "Gender",
            Column::BirthYear => "Birth Year",
        }
    }

    /// Look up a column by its (trimmed) header text.
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Which columns a trip table carries.
///
/// Computed once at load time; statistics check it instead of probing individual records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripSchema {
    present: u8,
}

impl TripSchema {
    /// A schema carrying exactly `columns`. [`Column::StartTime`] is always included.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let present = columns
            .into_iter()
            .fold(Column::StartTime.bit(), |acc, c| acc | c.bit());
        Self { present }
    }

    /// A schema carrying every column.
    pub fn full() -> Self {
        Self::new(Column::ALL)
    }

    pub fn has(&self, column: Column) -> bool {
        self.present & column.bit() != 0
    }

    /// Iterate present columns in canonical order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL.into_iter().filter(move |c| self.has(*c))
    }

    /// Iterate absent columns in canonical order.
    pub fn missing(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL.into_iter().filter(move |c| !self.has(*c))
    }

    /// `Err(MissingColumn)` unless `column` is present.
    pub fn require(&self, column: Column) -> crate::TripResult<()> {
        if self.has(column) {
            Ok(())
        } else {
            Err(crate::TripError::MissingColumn {
                column: column.header(),
            })
        }
    }
}

/// One trip. Optional fields are `None` when the column is absent or the cell was blank.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Seconds.
    pub trip_duration: Option<f64>,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

impl TripRecord {
    /// A record with only a start time; other fields are filled in by the loader or by callers.
    pub fn new(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time: None,
            trip_duration: None,
            start_station: None,
            end_station: None,
            user_type: None,
            gender: None,
            birth_year: None,
        }
    }

    pub fn month(&self) -> Month {
        Month::of(&self.start_time)
    }

    pub fn weekday(&self) -> Weekday {
        Weekday::of(&self.start_time)
    }

    /// Start hour, 0..=23.
    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }

    /// `"<start> to <end>"`, or `None` if either endpoint is missing.
    pub fn route(&self) -> Option<String> {
        match (&self.start_station, &self.end_station) {
            (Some(start), Some(end)) => Some(format!("{start} to {end}")),
            _ => None,
        }
    }
}

/// In-memory trip table.
///
/// Narrowing never mutates a table; every filter step returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct TripTable {
    /// Columns carried by the source file.
    pub schema: TripSchema,
    /// Records in source-file order.
    pub records: Vec<TripRecord>,
}

impl TripTable {
    pub fn new(schema: TripSchema, records: Vec<TripRecord>) -> Self {
        Self { schema, records }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create a new table containing only records that match `predicate`.
    ///
    /// The returned table keeps the original schema and record order.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&TripRecord) -> bool,
    {
        let records = self
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        Self {
            schema: self.schema,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, TripRecord, TripSchema, TripTable};
    use chrono::NaiveDate;

    fn record(day: u32, hour: u32) -> TripRecord {
        let ts = NaiveDate::from_ymd_opt(2017, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        TripRecord::new(ts)
    }

    #[test]
    fn schema_always_carries_start_time() {
        let schema = TripSchema::new([Column::TripDuration]);
        assert!(schema.has(Column::StartTime));
        assert!(schema.has(Column::TripDuration));
        assert!(!schema.has(Column::Gender));
        assert_eq!(
            schema.columns().collect::<Vec<_>>(),
            vec![Column::StartTime, Column::TripDuration]
        );
    }

    #[test]
    fn require_names_the_missing_column() {
        let schema = TripSchema::new([Column::UserType]);
        let err = schema.require(Column::BirthYear).unwrap_err();
        assert_eq!(err.to_string(), "column 'Birth Year' is not available in this dataset");
        assert!(err.is_recoverable());
    }

    #[test]
    fn headers_round_trip() {
        for c in Column::ALL {
            assert_eq!(Column::from_header(c.header()), Some(c));
        }
        assert_eq!(Column::from_header(" Gender "), Some(Column::Gender));
        assert_eq!(Column::from_header(""), None);
    }

    #[test]
    fn filter_rows_preserves_order_and_source() {
        let table = TripTable::new(
            TripSchema::full(),
            vec![record(1, 8), record(2, 9), record(3, 8)],
        );
        let out = table.filter_rows(|r| r.hour() == 8);

        assert_eq!(out.schema, table.schema);
        assert_eq!(out.records, vec![record(1, 8), record(3, 8)]);
        // Original unchanged
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn route_needs_both_endpoints() {
        let mut r = record(1, 8);
        r.start_station = Some("A".to_string());
        assert_eq!(r.route(), None);
        r.end_station = Some("B".to_string());
        assert_eq!(r.route(), Some("A to B".to_string()));
    }
}
