use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::row::{enum_at, opt_timestamp_at, opt_uuid_at, timestamp_at, uuid_at};
use crate::db::{format_timestamp, DatabaseError};
use crate::models::enums::{PaymentMethod, PaymentStatus};
use crate::models::Payment;

pub(crate) const PAYMENT_COLUMNS: &str = "id, patient_id, examination_id, amount, payment_method,
    status, notes, paid_at, created_at, updated_at";

pub(crate) fn payment_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: uuid_at(row, offset)?,
        patient_id: uuid_at(row, offset + 1)?,
        examination_id: opt_uuid_at(row, offset + 2)?,
        amount: row.get(offset + 3)?,
        payment_method: enum_at(row, offset + 4)?,
        status: enum_at(row, offset + 5)?,
        notes: row.get(offset + 6)?,
        paid_at: opt_timestamp_at(row, offset + 7)?,
        created_at: timestamp_at(row, offset + 8)?,
        updated_at: timestamp_at(row, offset + 9)?,
    })
}

pub fn insert_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payments (id, patient_id, examination_id, amount, payment_method, status,
         notes, paid_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            payment.id.to_string(),
            payment.patient_id.to_string(),
            payment.examination_id.map(|id| id.to_string()),
            payment.amount,
            payment.payment_method.as_str(),
            payment.status.as_str(),
            payment.notes,
            payment.paid_at.as_ref().map(format_timestamp),
            format_timestamp(&payment.created_at),
            format_timestamp(&payment.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_payment(conn: &Connection, id: &Uuid) -> Result<Option<Payment>, DatabaseError> {
    let payment = conn
        .query_row(
            &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"),
            params![id.to_string()],
            |row| payment_from_row(row, 0),
        )
        .optional()?;
    Ok(payment)
}

pub fn list_payments_for_examination(
    conn: &Connection,
    examination_id: &Uuid,
) -> Result<Vec<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE examination_id = ?1 ORDER BY created_at"
    ))?;
    let rows = stmt
        .query_map(params![examination_id.to_string()], |row| payment_from_row(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Amounts of every payment in `status`; callers reduce them.
pub fn list_amounts_by_status(
    conn: &Connection,
    status: PaymentStatus,
) -> Result<Vec<f64>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT amount FROM payments WHERE status = ?1")?;
    let rows = stmt
        .query_map(params![status.as_str()], |row| row.get(0))?
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(rows)
}

/// Settle a pending payment: amount, method, status and paid_at in one update.
///
/// Returns `false` when the payment is missing or no longer pending.
pub fn settle_payment(
    conn: &Connection,
    id: &Uuid,
    amount: f64,
    method: PaymentMethod,
    paid_at: &DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE payments SET amount = ?1, payment_method = ?2, status = ?3, paid_at = ?4,
         updated_at = ?4 WHERE id = ?5 AND status = ?6",
        params![
            amount,
            method.as_str(),
            PaymentStatus::Completed.as_str(),
            format_timestamp(paid_at),
            id.to_string(),
            PaymentStatus::Pending.as_str(),
        ],
    )?;
    Ok(updated == 1)
}
