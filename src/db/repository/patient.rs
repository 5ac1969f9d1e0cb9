use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::row::{opt_date_at, timestamp_at, uuid_at};
use crate::db::{format_timestamp, DatabaseError};
use crate::models::Patient;

pub(crate) const PATIENT_COLUMNS: &str = "id, profile_id, date_of_birth, address, blood_type,
    allergies, emergency_contact_name, emergency_contact_phone, created_at, updated_at";

pub(crate) fn patient_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: uuid_at(row, offset)?,
        profile_id: uuid_at(row, offset + 1)?,
        date_of_birth: opt_date_at(row, offset + 2)?,
        address: row.get(offset + 3)?,
        blood_type: row.get(offset + 4)?,
        allergies: row.get(offset + 5)?,
        emergency_contact_name: row.get(offset + 6)?,
        emergency_contact_phone: row.get(offset + 7)?,
        created_at: timestamp_at(row, offset + 8)?,
        updated_at: timestamp_at(row, offset + 9)?,
    })
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, profile_id, date_of_birth, address, blood_type, allergies,
         emergency_contact_name, emergency_contact_phone, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            patient.id.to_string(),
            patient.profile_id.to_string(),
            patient.date_of_birth.map(|d| d.to_string()),
            patient.address,
            patient.blood_type,
            patient.allergies,
            patient.emergency_contact_name,
            patient.emergency_contact_phone,
            format_timestamp(&patient.created_at),
            format_timestamp(&patient.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_patient_by_profile(
    conn: &Connection,
    profile_id: &Uuid,
) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE profile_id = ?1"),
            params![profile_id.to_string()],
            |row| patient_from_row(row, 0),
        )
        .optional()?;
    Ok(patient)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}
