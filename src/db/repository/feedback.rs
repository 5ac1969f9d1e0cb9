use rusqlite::{params, Connection};

use crate::db::{format_timestamp, DatabaseError};
use crate::models::PatientFeedback;

pub fn insert_feedback(conn: &Connection, feedback: &PatientFeedback) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_feedback (id, patient_id, rating, feedback_text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            feedback.id.to_string(),
            feedback.patient_id.to_string(),
            feedback.rating,
            feedback.feedback_text,
            format_timestamp(&feedback.created_at),
        ],
    )?;
    Ok(())
}

/// Every rating ever submitted.
pub fn list_ratings(conn: &Connection) -> Result<Vec<i32>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT rating FROM patient_feedback")?;
    let rows = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;
    Ok(rows)
}
