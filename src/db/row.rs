//! Column decoders for rows stored with text ids, dates and enums.
//!
//! Used inside `query_map` closures, so failures are reported as
//! `FromSqlConversionFailure` with the offending column index.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use super::DatabaseError;

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

pub fn opt_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_timestamp(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

pub fn opt_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::QueueStatus;
    use rusqlite::Connection;

    #[test]
    fn decodes_text_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let (uuid, date, ts, status, missing) = conn
            .query_row(
                "SELECT ?1, '2025-02-03', '2025-02-03T04:05:06.000000Z', 'in_progress', NULL",
                [id.to_string()],
                |row| {
                    Ok((
                        uuid_at(row, 0)?,
                        date_at(row, 1)?,
                        timestamp_at(row, 2)?,
                        enum_at::<QueueStatus>(row, 3)?,
                        opt_uuid_at(row, 4)?,
                    ))
                },
            )
            .unwrap();
        assert_eq!(uuid, id);
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 2, 3).unwrap());
        assert_eq!(ts.to_rfc3339(), "2025-02-03T04:05:06+00:00");
        assert_eq!(status, QueueStatus::InProgress);
        assert!(missing.is_none());
    }

    #[test]
    fn bad_enum_reports_conversion_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .query_row("SELECT 'teleported'", [], |row| enum_at::<QueueStatus>(row, 0))
            .unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(0, _, _)));
    }
}
