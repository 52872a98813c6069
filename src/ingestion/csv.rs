//! CSV trip-file ingestion.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{TripError, TripResult};
use crate::types::{Column, TripRecord, TripSchema, TripTable};

/// Timestamp layouts accepted for `Start Time` / `End Time`. `%.f` makes fractional seconds
/// optional.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Ingest a trip CSV file into an in-memory [`TripTable`].
///
/// Rules:
///
/// - The file must have a header row containing `Start Time`.
/// - Other known columns are optional; unknown columns are ignored; order can differ.
/// - Every `Start Time` cell must parse as `YYYY-MM-DD HH:MM:SS`.
///
/// The file handle is dropped before this function returns.
pub fn ingest_trips_from_path(path: impl AsRef<Path>) -> TripResult<TripTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TripError::NotFound {
            path: path.to_path_buf(),
        },
        _ => TripError::Io(e),
    })?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    ingest_trips_from_reader(&mut rdr)
}

/// Ingest trips from an existing CSV reader.
pub fn ingest_trips_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> TripResult<TripTable> {
    let headers = rdr.headers()?.clone();

    // Known column -> CSV column index (allows re-ordered and extra CSV columns).
    let mut col_idxs: Vec<(Column, usize)> = Vec::with_capacity(Column::ALL.len());
    for (idx, header) in headers.iter().enumerate() {
        if let Some(column) = Column::from_header(header) {
            if !col_idxs.iter().any(|(c, _)| *c == column) {
                col_idxs.push((column, idx));
            }
        }
    }

    let start_idx = match col_idxs.iter().find(|(c, _)| *c == Column::StartTime) {
        Some((_, idx)) => *idx,
        None => {
            return Err(TripError::SchemaMismatch {
                message: format!(
                    "missing required column '{}'. headers={:?}",
                    Column::StartTime.header(),
                    headers.iter().collect::<Vec<_>>()
                ),
            });
        }
    };

    let schema = TripSchema::new(col_idxs.iter().map(|(c, _)| *c));

    let mut records = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let raw_start = record.get(start_idx).unwrap_or("");
        let mut trip = TripRecord::new(parse_timestamp(user_row, Column::StartTime, raw_start)?);

        for &(column, csv_idx) in &col_idxs {
            let raw = record.get(csv_idx).unwrap_or("");
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            match column {
                Column::StartTime => {}
                Column::EndTime => {
                    trip.end_time = Some(parse_timestamp(user_row, column, raw)?);
                }
                Column::TripDuration => {
                    trip.trip_duration = Some(parse_seconds(user_row, column, raw)?);
                }
                Column::StartStation => trip.start_station = Some(trimmed.to_owned()),
                Column::EndStation => trip.end_station = Some(trimmed.to_owned()),
                Column::UserType => trip.user_type = Some(trimmed.to_owned()),
                Column::Gender => trip.gender = Some(trimmed.to_owned()),
                Column::BirthYear => {
                    trip.birth_year = Some(parse_year(user_row, column, raw)?);
                }
            }
        }
        records.push(trip);
    }

    Ok(TripTable::new(schema, records))
}

/// Parse a timestamp cell using the accepted layouts.
pub fn parse_timestamp(row: usize, column: Column, raw: &str) -> TripResult<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(parse_error(row, column, raw, "timestamp is empty".to_string()));
    }

    let mut last_err = None;
    for fmt in TIMESTAMP_FORMATS {
        match NaiveDateTime::parse_from_str(trimmed, fmt) {
            Ok(ts) => return Ok(ts),
            Err(e) => last_err = Some(e),
        }
    }
    let message = match last_err {
        Some(e) => format!("expected YYYY-MM-DD HH:MM:SS: {e}"),
        None => "expected YYYY-MM-DD HH:MM:SS".to_string(),
    };
    Err(parse_error(row, column, raw, message))
}

fn parse_seconds(row: usize, column: Column, raw: &str) -> TripResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(parse_error(row, column, raw, "duration must be finite".to_string())),
        Err(e) => Err(parse_error(row, column, raw, e.to_string())),
    }
}

// Birth years are stored as floats (`1989.0`) in files where the column has blanks.
fn parse_year(row: usize, column: Column, raw: &str) -> TripResult<i32> {
    let v = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| parse_error(row, column, raw, e.to_string()))?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return Err(parse_error(row, column, raw, "expected a whole year".to_string()));
    }
    Ok(v as i32)
}

fn parse_error(row: usize, column: Column, raw: &str, message: String) -> TripError {
    TripError::ParseError {
        row,
        column: column.header().to_owned(),
        raw: raw.to_owned(),
        message,
    }
}
