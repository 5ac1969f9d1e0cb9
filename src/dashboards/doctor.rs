//! Doctor dashboard: today's queue, examinations and prescriptions.

use chrono::NaiveDate;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, ClinicError, RECENT_LIMIT};
use crate::db::repository::{
    examination_from_row, get_queue_entry, insert_examination, insert_payment,
    insert_prescription, insert_prescription_items, qualified, queue_entry_from_row,
    transition_queue_status, update_queue_status, EXAMINATION_COLUMNS, QUEUE_COLUMNS,
};
use crate::db::now_timestamp;
use crate::models::enums::{PaymentMethod, PaymentStatus, PrescriptionStatus, QueueStatus};
use crate::models::{Examination, Payment, Prescription, PrescriptionItem, Profile, QueueEntry};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Queue row with the patient's name and email joined in.
#[derive(Debug, Clone, Serialize)]
pub struct QueueWithPatient {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExaminationWithPatient {
    #[serde(flatten)]
    pub examination: Examination,
    pub patient_name: Option<String>,
}

/// Findings entered by the doctor for one queue entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExaminationForm {
    #[serde(default)]
    pub physical_examination: Option<String>,
    pub diagnosis: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One prescription line as entered. Lines with a blank medicine name are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescriptionItemInput {
    #[serde(default)]
    pub medicine_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Everything written by one examination submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedExamination {
    pub examination: Examination,
    pub prescription: Option<Prescription>,
    pub items: Vec<PrescriptionItem>,
    pub payment: Payment,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDashboard {
    pub queue: Vec<QueueWithPatient>,
    pub recent_examinations: Vec<ExaminationWithPatient>,
    pub waiting_count: usize,
    pub in_progress_count: usize,
}

// ═══════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════

/// Entries for `today` that are waiting or in progress, by queue number.
pub fn todays_queue(conn: &Connection, today: NaiveDate) -> Result<Vec<QueueWithPatient>, ClinicError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, pr.full_name, pr.email
         FROM patient_queue q
         LEFT JOIN patients p ON p.id = q.patient_id
         LEFT JOIN profiles pr ON pr.id = p.profile_id
         WHERE q.queue_date = ?1 AND q.status IN (?2, ?3)
         ORDER BY q.queue_number ASC",
        qualified(QUEUE_COLUMNS, "q")
    ))?;
    let rows = stmt
        .query_map(
            params![
                today.to_string(),
                QueueStatus::Waiting.as_str(),
                QueueStatus::InProgress.as_str()
            ],
            |row| {
                Ok(QueueWithPatient {
                    entry: queue_entry_from_row(row, 0)?,
                    patient_name: row.get(8)?,
                    patient_email: row.get(9)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The doctor's most recent examinations.
pub fn recent_examinations(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<ExaminationWithPatient>, ClinicError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, pr.full_name
         FROM examinations e
         LEFT JOIN patients p ON p.id = e.patient_id
         LEFT JOIN profiles pr ON pr.id = p.profile_id
         WHERE e.doctor_id = ?1
         ORDER BY e.examination_date DESC, e.rowid DESC
         LIMIT ?2",
        qualified(EXAMINATION_COLUMNS, "e")
    ))?;
    let rows = stmt
        .query_map(params![doctor_id.to_string(), RECENT_LIMIT], |row| {
            Ok(ExaminationWithPatient {
                examination: examination_from_row(row, 0)?,
                patient_name: row.get(11)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load(conn: &Connection, profile: &Profile, today: NaiveDate) -> Result<DoctorDashboard, ClinicError> {
    let queue = todays_queue(conn, today)?;
    let waiting_count = queue.iter().filter(|q| q.entry.status == QueueStatus::Waiting).count();
    let in_progress_count = queue.iter().filter(|q| q.entry.status == QueueStatus::InProgress).count();
    Ok(DoctorDashboard {
        recent_examinations: recent_examinations(conn, &profile.id)?,
        queue,
        waiting_count,
        in_progress_count,
    })
}

// ═══════════════════════════════════════════════════════════
// Mutations
// ═══════════════════════════════════════════════════════════

/// Move a waiting entry to in progress.
pub fn start_examination(conn: &Connection, queue_id: &Uuid) -> Result<QueueEntry, ClinicError> {
    let mut entry = get_queue_entry(conn, queue_id)?.ok_or(ClinicError::NotFound {
        entity: "queue entry",
        id: *queue_id,
    })?;
    if entry.status != QueueStatus::Waiting {
        return Err(ClinicError::InvalidTransition {
            entity: "queue entry",
            from: entry.status.to_string(),
            to: QueueStatus::InProgress.to_string(),
        });
    }
    if !transition_queue_status(conn, queue_id, QueueStatus::Waiting, QueueStatus::InProgress)? {
        let current = get_queue_entry(conn, queue_id)?.ok_or(ClinicError::NotFound {
            entity: "queue entry",
            id: *queue_id,
        })?;
        return Err(ClinicError::InvalidTransition {
            entity: "queue entry",
            from: current.status.to_string(),
            to: QueueStatus::InProgress.to_string(),
        });
    }
    entry.status = QueueStatus::InProgress;
    tracing::info!(queue_number = entry.queue_number, "Examination started");
    Ok(entry)
}

/// Record an examination for a queue entry.
///
/// Writes the examination, the prescription and its items (only when at
/// least one line names a medicine), a pending zero-amount cash payment, and
/// completes the queue entry. All of it commits together or not at all.
pub fn submit_examination(
    conn: &mut Connection,
    doctor: &Profile,
    queue_id: &Uuid,
    form: &ExaminationForm,
    items: &[PrescriptionItemInput],
) -> Result<SubmittedExamination, ClinicError> {
    let diagnosis = form.diagnosis.trim();
    if diagnosis.is_empty() {
        return Err(ClinicError::Validation("Diagnosis is required".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let entry = get_queue_entry(&tx, queue_id)?.ok_or(ClinicError::NotFound {
        entity: "queue entry",
        id: *queue_id,
    })?;
    if !matches!(entry.status, QueueStatus::Waiting | QueueStatus::InProgress) {
        return Err(ClinicError::InvalidTransition {
            entity: "queue entry",
            from: entry.status.to_string(),
            to: QueueStatus::Completed.to_string(),
        });
    }

    let now = now_timestamp();
    let examination = Examination {
        id: Uuid::new_v4(),
        patient_id: entry.patient_id,
        doctor_id: doctor.id,
        queue_id: Some(entry.id),
        chief_complaint: entry.complaint.clone(),
        physical_examination: non_blank(form.physical_examination.as_deref()),
        diagnosis: diagnosis.to_string(),
        notes: non_blank(form.notes.as_deref()),
        examination_date: now,
        created_at: now,
        updated_at: now,
    };
    insert_examination(&tx, &examination)?;

    let mut prescription = None;
    let mut prescribed = Vec::new();
    let named: Vec<_> = items.iter().filter(|i| !i.medicine_name.trim().is_empty()).collect();
    if !named.is_empty() {
        let header = Prescription {
            id: Uuid::new_v4(),
            examination_id: examination.id,
            patient_id: entry.patient_id,
            doctor_id: doctor.id,
            status: PrescriptionStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        insert_prescription(&tx, &header)?;
        prescribed = named
            .into_iter()
            .map(|input| PrescriptionItem {
                id: Uuid::new_v4(),
                prescription_id: header.id,
                medicine_name: input.medicine_name.trim().to_string(),
                dosage: input.dosage.trim().to_string(),
                frequency: input.frequency.trim().to_string(),
                duration: input.duration.trim().to_string(),
                instructions: non_blank(input.instructions.as_deref()),
                created_at: now,
            })
            .collect();
        insert_prescription_items(&tx, &prescribed)?;
        prescription = Some(header);
    }

    let payment = Payment {
        id: Uuid::new_v4(),
        patient_id: entry.patient_id,
        examination_id: Some(examination.id),
        amount: 0.0,
        payment_method: PaymentMethod::Cash,
        status: PaymentStatus::Pending,
        notes: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };
    insert_payment(&tx, &payment)?;
    update_queue_status(&tx, &entry.id, QueueStatus::Completed)?;
    tx.commit()?;

    tracing::info!(
        queue_number = entry.queue_number,
        items = prescribed.len(),
        "Examination recorded"
    );
    Ok(SubmittedExamination {
        examination,
        prescription,
        items: prescribed,
        payment,
    })
}
