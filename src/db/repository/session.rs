use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::row::{timestamp_at, uuid_at};
use crate::db::{format_timestamp, DatabaseError};

/// A stored bearer session. Only the token hash is persisted.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub token_hash: String,
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub fn insert_session(conn: &Connection, session: &StoredSession) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_sessions (token_hash, profile_id, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            session.token_hash,
            session.profile_id.to_string(),
            format_timestamp(&session.created_at),
            format_timestamp(&session.expires_at),
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, token_hash: &str) -> Result<Option<StoredSession>, DatabaseError> {
    let session = conn
        .query_row(
            "SELECT token_hash, profile_id, created_at, expires_at FROM auth_sessions
             WHERE token_hash = ?1",
            params![token_hash],
            |row| {
                Ok(StoredSession {
                    token_hash: row.get(0)?,
                    profile_id: uuid_at(row, 1)?,
                    created_at: timestamp_at(row, 2)?,
                    expires_at: timestamp_at(row, 3)?,
                })
            },
        )
        .optional()?;
    Ok(session)
}

/// Returns whether a row was removed.
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM auth_sessions WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(deleted > 0)
}

pub fn delete_expired_sessions(conn: &Connection, now: &DateTime<Utc>) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM auth_sessions WHERE expires_at <= ?1",
        params![format_timestamp(now)],
    )?;
    Ok(deleted)
}
