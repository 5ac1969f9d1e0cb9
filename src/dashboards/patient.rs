//! Patient dashboard: visit queue registration, visit history, feedback.

use chrono::NaiveDate;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

use super::{non_blank, ClinicError};
use crate::db::repository::{
    examination_from_row, get_patient_by_profile, insert_feedback, insert_queue_entry,
    list_queue_by_patient, next_queue_number, qualified, EXAMINATION_COLUMNS,
};
use crate::db::now_timestamp;
use crate::models::enums::QueueStatus;
use crate::models::{Examination, Patient, PatientFeedback, Profile, QueueEntry, MAX_RATING, MIN_RATING};

/// An examination as the patient sees it, with the examining doctor's name.
#[derive(Debug, Clone, Serialize)]
pub struct ExaminationWithDoctor {
    #[serde(flatten)]
    pub examination: Examination,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientDashboard {
    pub patient_id: Uuid,
    pub queue: Vec<QueueEntry>,
    pub todays_queue: Vec<QueueEntry>,
    pub examinations: Vec<ExaminationWithDoctor>,
    pub waiting_count: usize,
    pub total_visits: usize,
}

/// The patient row behind a patient-role profile.
pub fn patient_for_profile(conn: &Connection, profile: &Profile) -> Result<Patient, ClinicError> {
    get_patient_by_profile(conn, &profile.id)?.ok_or(ClinicError::PatientNotFound(profile.id))
}

/// Register a visit for `today`. The next number is computed and inserted
/// under one immediate transaction so concurrent registrations serialize.
pub fn register_queue(
    conn: &mut Connection,
    profile: &Profile,
    complaint: &str,
    today: NaiveDate,
) -> Result<QueueEntry, ClinicError> {
    let complaint = complaint.trim();
    if complaint.is_empty() {
        return Err(ClinicError::Validation("Complaint is required".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let patient = patient_for_profile(&tx, profile)?;
    let now = now_timestamp();
    let entry = QueueEntry {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        queue_number: next_queue_number(&tx, &today)?,
        queue_date: today,
        complaint: complaint.to_string(),
        status: QueueStatus::Waiting,
        created_at: now,
        updated_at: now,
    };
    insert_queue_entry(&tx, &entry)?;
    tx.commit()?;

    tracing::info!(queue_number = entry.queue_number, date = %today, "Queue entry registered");
    Ok(entry)
}

/// Every queue entry of the patient, newest first.
pub fn queue_history(conn: &Connection, patient_id: &Uuid) -> Result<Vec<QueueEntry>, ClinicError> {
    Ok(list_queue_by_patient(conn, patient_id)?)
}

/// Examinations of the patient, newest first, with the doctor's name.
pub fn examination_history(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<ExaminationWithDoctor>, ClinicError> {
    let columns = qualified(EXAMINATION_COLUMNS, "e");
    let mut stmt = conn.prepare(&format!(
        "SELECT {columns}, d.full_name
         FROM examinations e
         LEFT JOIN profiles d ON d.id = e.doctor_id
         WHERE e.patient_id = ?1
         ORDER BY e.examination_date DESC, e.rowid DESC"
    ))?;
    let rows = stmt
        .query_map(params![patient_id.to_string()], |row| {
            Ok(ExaminationWithDoctor {
                examination: examination_from_row(row, 0)?,
                doctor_name: row.get(11)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Record a satisfaction rating. Feedback is append-only.
pub fn submit_feedback(
    conn: &Connection,
    profile: &Profile,
    rating: i32,
    feedback_text: Option<&str>,
) -> Result<PatientFeedback, ClinicError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ClinicError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    let patient = patient_for_profile(conn, profile)?;
    let feedback = PatientFeedback {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        rating,
        feedback_text: non_blank(feedback_text),
        created_at: now_timestamp(),
    };
    insert_feedback(conn, &feedback)?;
    tracing::info!(rating, "Feedback submitted");
    Ok(feedback)
}

pub fn load(conn: &Connection, profile: &Profile, today: NaiveDate) -> Result<PatientDashboard, ClinicError> {
    let patient = patient_for_profile(conn, profile)?;
    let queue = queue_history(conn, &patient.id)?;
    let examinations = examination_history(conn, &patient.id)?;
    let todays_queue = queue.iter().filter(|q| q.queue_date == today).cloned().collect();
    let waiting_count = queue.iter().filter(|q| q.status == QueueStatus::Waiting).count();
    Ok(PatientDashboard {
        patient_id: patient.id,
        waiting_count,
        total_visits: examinations.len(),
        queue,
        todays_queue,
        examinations,
    })
}
