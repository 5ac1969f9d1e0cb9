pub mod row;
pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl DatabaseError {
    /// True when SQLite rejected a write because of a UNIQUE or CHECK rule.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::ConstraintViolation(_) => true,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }
}

/// Fixed-width UTC timestamp so that text ordering matches time ordering.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time, truncated to the stored precision.
pub fn now_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::parse_from_rfc3339(&format_timestamp(&now))
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_fixed_width() {
        let a = format_timestamp(&DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z").unwrap().with_timezone(&Utc));
        let b = format_timestamp(&DateTime::parse_from_rfc3339("2025-03-01T08:00:00.5Z").unwrap().with_timezone(&Utc));
        assert_eq!(a, "2025-03-01T08:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn now_timestamp_round_trips() {
        let now = now_timestamp();
        let parsed = DateTime::parse_from_rfc3339(&format_timestamp(&now)).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), now);
    }
}
