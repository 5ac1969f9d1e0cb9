use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::row::{enum_at, timestamp_at, uuid_at};
use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::enums::PrescriptionStatus;
use crate::models::{Prescription, PrescriptionItem};

pub(crate) const PRESCRIPTION_COLUMNS: &str =
    "id, examination_id, patient_id, doctor_id, status, notes, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, prescription_id, medicine_name, dosage, frequency, duration, instructions, created_at";

pub(crate) fn prescription_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: uuid_at(row, offset)?,
        examination_id: uuid_at(row, offset + 1)?,
        patient_id: uuid_at(row, offset + 2)?,
        doctor_id: uuid_at(row, offset + 3)?,
        status: enum_at(row, offset + 4)?,
        notes: row.get(offset + 5)?,
        created_at: timestamp_at(row, offset + 6)?,
        updated_at: timestamp_at(row, offset + 7)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionItem> {
    Ok(PrescriptionItem {
        id: uuid_at(row, 0)?,
        prescription_id: uuid_at(row, 1)?,
        medicine_name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        duration: row.get(5)?,
        instructions: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
    })
}

pub fn insert_prescription(conn: &Connection, prescription: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, examination_id, patient_id, doctor_id, status, notes,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            prescription.id.to_string(),
            prescription.examination_id.to_string(),
            prescription.patient_id.to_string(),
            prescription.doctor_id.to_string(),
            prescription.status.as_str(),
            prescription.notes,
            format_timestamp(&prescription.created_at),
            format_timestamp(&prescription.updated_at),
        ],
    )?;
    Ok(())
}

/// Insert one or many items with a single prepared statement.
pub fn insert_prescription_items(
    conn: &Connection,
    items: &[PrescriptionItem],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO prescription_items (id, prescription_id, medicine_name, dosage, frequency,
         duration, instructions, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for item in items {
        stmt.execute(params![
            item.id.to_string(),
            item.prescription_id.to_string(),
            item.medicine_name,
            item.dosage,
            item.frequency,
            item.duration,
            item.instructions,
            format_timestamp(&item.created_at),
        ])?;
    }
    Ok(())
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Option<Prescription>, DatabaseError> {
    let prescription = conn
        .query_row(
            &format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1"),
            params![id.to_string()],
            |row| prescription_from_row(row, 0),
        )
        .optional()?;
    Ok(prescription)
}

pub fn get_prescription_by_examination(
    conn: &Connection,
    examination_id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let prescription = conn
        .query_row(
            &format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE examination_id = ?1"),
            params![examination_id.to_string()],
            |row| prescription_from_row(row, 0),
        )
        .optional()?;
    Ok(prescription)
}

pub fn list_prescription_items(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<Vec<PrescriptionItem>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM prescription_items WHERE prescription_id = ?1
         ORDER BY created_at, rowid"
    ))?;
    let items = stmt
        .query_map(params![prescription_id.to_string()], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

pub fn update_prescription_status(
    conn: &Connection,
    id: &Uuid,
    status: PrescriptionStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), format_timestamp(&now_timestamp()), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
