use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::row::{date_at, enum_at, timestamp_at, uuid_at};
use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::enums::QueueStatus;
use crate::models::QueueEntry;

pub(crate) const QUEUE_COLUMNS: &str =
    "id, patient_id, queue_number, queue_date, complaint, status, created_at, updated_at";

pub(crate) fn queue_entry_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<QueueEntry> {
    Ok(QueueEntry {
        id: uuid_at(row, offset)?,
        patient_id: uuid_at(row, offset + 1)?,
        queue_number: row.get(offset + 2)?,
        queue_date: date_at(row, offset + 3)?,
        complaint: row.get(offset + 4)?,
        status: enum_at(row, offset + 5)?,
        created_at: timestamp_at(row, offset + 6)?,
        updated_at: timestamp_at(row, offset + 7)?,
    })
}

pub fn insert_queue_entry(conn: &Connection, entry: &QueueEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_queue (id, patient_id, queue_number, queue_date, complaint, status,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id.to_string(),
            entry.patient_id.to_string(),
            entry.queue_number,
            entry.queue_date.to_string(),
            entry.complaint,
            entry.status.as_str(),
            format_timestamp(&entry.created_at),
            format_timestamp(&entry.updated_at),
        ],
    )?;
    Ok(())
}

/// Highest number issued for `date` plus one, or 1 for an empty day.
///
/// Only race-free when called inside the same write transaction as the
/// insert that uses the number.
pub fn next_queue_number(conn: &Connection, date: &NaiveDate) -> Result<i64, DatabaseError> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(queue_number), 0) + 1 FROM patient_queue WHERE queue_date = ?1",
        params![date.to_string()],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub fn get_queue_entry(conn: &Connection, id: &Uuid) -> Result<Option<QueueEntry>, DatabaseError> {
    let entry = conn
        .query_row(
            &format!("SELECT {QUEUE_COLUMNS} FROM patient_queue WHERE id = ?1"),
            params![id.to_string()],
            |row| queue_entry_from_row(row, 0),
        )
        .optional()?;
    Ok(entry)
}

/// A patient's queue history, newest registration first.
pub fn list_queue_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<QueueEntry>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUEUE_COLUMNS} FROM patient_queue WHERE patient_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt
        .query_map(params![patient_id.to_string()], |row| queue_entry_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn update_queue_status(
    conn: &Connection,
    id: &Uuid,
    status: QueueStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE patient_queue SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), format_timestamp(&now_timestamp()), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient_queue".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Move an entry from `from` to `to`. Returns `false` when the entry is
/// missing or no longer in `from`.
pub fn transition_queue_status(
    conn: &Connection,
    id: &Uuid,
    from: QueueStatus,
    to: QueueStatus,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE patient_queue SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![
            to.as_str(),
            format_timestamp(&now_timestamp()),
            id.to_string(),
            from.as_str()
        ],
    )?;
    Ok(updated == 1)
}
