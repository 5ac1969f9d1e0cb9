//! Owner dashboard: read-only business metrics.

use rusqlite::{params, Connection};
use serde::Serialize;

use super::administration::{recent_completed_payments, total_revenue, PaymentWithPatient};
use super::{ClinicError, RECENT_LIMIT};
use crate::db::repository::{count_examinations, count_patients, list_ratings};
use crate::db::row::{timestamp_at, uuid_at};
use crate::models::PatientFeedback;

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackWithPatient {
    #[serde(flatten)]
    pub feedback: PatientFeedback,
    pub patient_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerDashboard {
    pub total_revenue: f64,
    pub total_patients: i64,
    pub total_examinations: i64,
    pub average_rating: f64,
    pub recent_payments: Vec<PaymentWithPatient>,
    pub recent_feedback: Vec<FeedbackWithPatient>,
}

/// Mean of all ratings, 0 when nobody has rated yet.
pub fn average_rating(conn: &Connection) -> Result<f64, ClinicError> {
    let ratings = list_ratings(conn)?;
    if ratings.is_empty() {
        return Ok(0.0);
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Ok(sum as f64 / ratings.len() as f64)
}

pub fn recent_feedback(conn: &Connection) -> Result<Vec<FeedbackWithPatient>, ClinicError> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.patient_id, f.rating, f.feedback_text, f.created_at, pr.full_name
         FROM patient_feedback f
         LEFT JOIN patients p ON p.id = f.patient_id
         LEFT JOIN profiles pr ON pr.id = p.profile_id
         ORDER BY f.created_at DESC, f.rowid DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![RECENT_LIMIT], |row| {
            Ok(FeedbackWithPatient {
                feedback: PatientFeedback {
                    id: uuid_at(row, 0)?,
                    patient_id: uuid_at(row, 1)?,
                    rating: row.get(2)?,
                    feedback_text: row.get(3)?,
                    created_at: timestamp_at(row, 4)?,
                },
                patient_name: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load(conn: &Connection) -> Result<OwnerDashboard, ClinicError> {
    Ok(OwnerDashboard {
        total_revenue: total_revenue(conn)?,
        total_patients: count_patients(conn)?,
        total_examinations: count_examinations(conn)?,
        average_rating: average_rating(conn)?,
        recent_payments: recent_completed_payments(conn)?,
        recent_feedback: recent_feedback(conn)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::administration::{process_payment, ProcessPayment};
    use crate::dashboards::doctor::{submit_examination, ExaminationForm};
    use crate::dashboards::patient::{register_queue, submit_feedback};
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{PaymentMethod, UserRole};
    use crate::test_support::{seed_patient, seed_profile};
    use chrono::NaiveDate;

    #[test]
    fn empty_clinic_reports_zeroes() {
        let conn = open_memory_database().unwrap();
        let dashboard = load(&conn).unwrap();
        assert_eq!(dashboard.total_revenue, 0.0);
        assert_eq!(dashboard.total_patients, 0);
        assert_eq!(dashboard.total_examinations, 0);
        assert_eq!(dashboard.average_rating, 0.0);
        assert!(dashboard.recent_payments.is_empty());
        assert!(dashboard.recent_feedback.is_empty());
    }

    #[test]
    fn average_rating_is_the_mean() {
        let conn = open_memory_database().unwrap();
        let (siti, _) = seed_patient(&conn, "Siti");
        for rating in [5, 4, 4, 2] {
            submit_feedback(&conn, &siti, rating, None).unwrap();
        }
        assert_eq!(average_rating(&conn).unwrap(), 3.75);
    }

    #[test]
    fn recent_feedback_newest_first_limited() {
        let conn = open_memory_database().unwrap();
        let (siti, _) = seed_patient(&conn, "Siti");
        for i in 0..12 {
            submit_feedback(&conn, &siti, 5, Some(&format!("Kunjungan {i}"))).unwrap();
        }
        let feedback = recent_feedback(&conn).unwrap();
        assert_eq!(feedback.len(), 10);
        assert_eq!(feedback[0].feedback.feedback_text.as_deref(), Some("Kunjungan 11"));
        assert_eq!(feedback[0].patient_name.as_deref(), Some("Siti"));
    }

    #[test]
    fn owner_sees_only_completed_payments() {
        let mut conn = open_memory_database().unwrap();
        let doctor = seed_profile(&conn, UserRole::Doctor, "dr. Andi");
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let form = ExaminationForm { diagnosis: "Demam".into(), ..Default::default() };
        let mut payment_ids = Vec::new();
        for name in ["Siti", "Budi"] {
            let (patient, _) = seed_patient(&conn, name);
            let entry = register_queue(&mut conn, &patient, "Demam", day).unwrap();
            payment_ids.push(submit_examination(&mut conn, &doctor, &entry.id, &form, &[]).unwrap().payment.id);
        }
        let settle = ProcessPayment { amount: 50_000.0, payment_method: PaymentMethod::Cash };
        process_payment(&conn, &payment_ids[1], &settle).unwrap();

        let dashboard = load(&conn).unwrap();
        assert_eq!(dashboard.total_revenue, 50_000.0);
        assert_eq!(dashboard.total_patients, 2);
        assert_eq!(dashboard.total_examinations, 2);
        assert_eq!(dashboard.recent_payments.len(), 1);
        assert_eq!(dashboard.recent_payments[0].payment.id, payment_ids[1]);
        assert_eq!(dashboard.recent_payments[0].patient_name.as_deref(), Some("Budi"));
    }
}
