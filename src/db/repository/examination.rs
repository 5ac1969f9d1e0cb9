use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::row::{opt_uuid_at, timestamp_at, uuid_at};
use crate::db::{format_timestamp, DatabaseError};
use crate::models::Examination;

pub(crate) const EXAMINATION_COLUMNS: &str = "id, patient_id, doctor_id, queue_id, chief_complaint,
    physical_examination, diagnosis, notes, examination_date, created_at, updated_at";

pub(crate) fn examination_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Examination> {
    Ok(Examination {
        id: uuid_at(row, offset)?,
        patient_id: uuid_at(row, offset + 1)?,
        doctor_id: uuid_at(row, offset + 2)?,
        queue_id: opt_uuid_at(row, offset + 3)?,
        chief_complaint: row.get(offset + 4)?,
        physical_examination: row.get(offset + 5)?,
        diagnosis: row.get(offset + 6)?,
        notes: row.get(offset + 7)?,
        examination_date: timestamp_at(row, offset + 8)?,
        created_at: timestamp_at(row, offset + 9)?,
        updated_at: timestamp_at(row, offset + 10)?,
    })
}

pub fn insert_examination(conn: &Connection, exam: &Examination) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO examinations (id, patient_id, doctor_id, queue_id, chief_complaint,
         physical_examination, diagnosis, notes, examination_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            exam.id.to_string(),
            exam.patient_id.to_string(),
            exam.doctor_id.to_string(),
            exam.queue_id.map(|id| id.to_string()),
            exam.chief_complaint,
            exam.physical_examination,
            exam.diagnosis,
            exam.notes,
            format_timestamp(&exam.examination_date),
            format_timestamp(&exam.created_at),
            format_timestamp(&exam.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_examination(conn: &Connection, id: &Uuid) -> Result<Option<Examination>, DatabaseError> {
    let exam = conn
        .query_row(
            &format!("SELECT {EXAMINATION_COLUMNS} FROM examinations WHERE id = ?1"),
            params![id.to_string()],
            |row| examination_from_row(row, 0),
        )
        .optional()?;
    Ok(exam)
}

pub fn count_examinations(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM examinations", [], |row| row.get(0))?;
    Ok(count)
}
