//! Administration dashboard: payment processing and revenue.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClinicError, RECENT_LIMIT};
use crate::db::now_timestamp;
use crate::db::repository::{
    get_payment, list_amounts_by_status, payment_from_row, qualified, settle_payment,
    PAYMENT_COLUMNS,
};
use crate::models::enums::{PaymentMethod, PaymentStatus};
use crate::models::Payment;

#[derive(Debug, Clone, Serialize)]
pub struct PaymentWithPatient {
    #[serde(flatten)]
    pub payment: Payment,
    pub patient_name: Option<String>,
}

/// Settlement entered by administration staff.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessPayment {
    pub amount: f64,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdministrationDashboard {
    pub payments: Vec<PaymentWithPatient>,
    pub total_revenue: f64,
    pub pending_count: usize,
}

const PAYMENTS_WITH_PATIENT: &str = "FROM payments pay
    LEFT JOIN patients p ON p.id = pay.patient_id
    LEFT JOIN profiles pr ON pr.id = p.profile_id";

/// Every payment, newest first, with the patient's name.
pub fn list_payments(conn: &Connection) -> Result<Vec<PaymentWithPatient>, ClinicError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, pr.full_name {PAYMENTS_WITH_PATIENT}
         ORDER BY pay.created_at DESC, pay.rowid DESC",
        qualified(PAYMENT_COLUMNS, "pay")
    ))?;
    let rows = stmt
        .query_map([], payment_with_patient)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The latest completed payments by settlement time.
pub fn recent_completed_payments(conn: &Connection) -> Result<Vec<PaymentWithPatient>, ClinicError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, pr.full_name {PAYMENTS_WITH_PATIENT}
         WHERE pay.status = ?1
         ORDER BY pay.paid_at DESC, pay.rowid DESC
         LIMIT ?2",
        qualified(PAYMENT_COLUMNS, "pay")
    ))?;
    let rows = stmt
        .query_map(params![PaymentStatus::Completed.as_str(), RECENT_LIMIT], payment_with_patient)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn payment_with_patient(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaymentWithPatient> {
    Ok(PaymentWithPatient {
        payment: payment_from_row(row, 0)?,
        patient_name: row.get(10)?,
    })
}

/// Sum of all completed payment amounts.
pub fn total_revenue(conn: &Connection) -> Result<f64, ClinicError> {
    Ok(list_amounts_by_status(conn, PaymentStatus::Completed)?.iter().sum())
}

/// Settle a pending payment with the entered amount and method.
pub fn process_payment(
    conn: &Connection,
    id: &Uuid,
    input: &ProcessPayment,
) -> Result<Payment, ClinicError> {
    if !input.amount.is_finite() || input.amount < 0.0 {
        return Err(ClinicError::Validation("Amount must be a non-negative number".into()));
    }
    let payment = get_payment(conn, id)?.ok_or(ClinicError::NotFound { entity: "payment", id: *id })?;
    if payment.status != PaymentStatus::Pending {
        return Err(ClinicError::InvalidTransition {
            entity: "payment",
            from: payment.status.to_string(),
            to: PaymentStatus::Completed.to_string(),
        });
    }

    let paid_at = now_timestamp();
    if !settle_payment(conn, id, input.amount, input.payment_method, &paid_at)? {
        // Settled by someone else between the read and the update.
        let current = get_payment(conn, id)?.ok_or(ClinicError::NotFound { entity: "payment", id: *id })?;
        return Err(ClinicError::InvalidTransition {
            entity: "payment",
            from: current.status.to_string(),
            to: PaymentStatus::Completed.to_string(),
        });
    }
    tracing::info!(payment_id = %id, method = %input.payment_method, "Payment processed");
    Ok(Payment {
        amount: input.amount,
        payment_method: input.payment_method,
        status: PaymentStatus::Completed,
        paid_at: Some(paid_at),
        updated_at: paid_at,
        ..payment
    })
}

pub fn load(conn: &Connection) -> Result<AdministrationDashboard, ClinicError> {
    let payments = list_payments(conn)?;
    let pending_count = payments
        .iter()
        .filter(|p| p.payment.status == PaymentStatus::Pending)
        .count();
    Ok(AdministrationDashboard {
        total_revenue: total_revenue(conn)?,
        payments,
        pending_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::doctor::{submit_examination, ExaminationForm};
    use crate::dashboards::patient::register_queue;
    use crate::db::sqlite::{open_database, open_memory_database};
    use crate::models::enums::UserRole;
    use crate::test_support::{seed_patient, seed_profile};
    use chrono::NaiveDate;
    use std::sync::{Arc, Barrier};

    /// Runs one visit to completion and returns its pending payment id.
    fn visit(conn: &mut Connection, name: &str) -> Uuid {
        let doctor = seed_profile(conn, UserRole::Doctor, "dr. Andi");
        let (patient, _) = seed_patient(conn, name);
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entry = register_queue(conn, &patient, "Demam", day).unwrap();
        let form = ExaminationForm { diagnosis: "Demam".into(), ..Default::default() };
        submit_examination(conn, &doctor, &entry.id, &form, &[]).unwrap().payment.id
    }

    fn settle(amount: f64, payment_method: PaymentMethod) -> ProcessPayment {
        ProcessPayment { amount, payment_method }
    }

    #[test]
    fn processing_adds_exactly_the_amount_to_revenue() {
        let mut conn = open_memory_database().unwrap();
        let first = visit(&mut conn, "Siti");
        let second = visit(&mut conn, "Budi");
        assert_eq!(total_revenue(&conn).unwrap(), 0.0);

        process_payment(&conn, &first, &settle(50_000.0, PaymentMethod::Cash)).unwrap();
        assert_eq!(total_revenue(&conn).unwrap(), 50_000.0);
        process_payment(&conn, &second, &settle(75_500.0, PaymentMethod::Debit)).unwrap();
        assert_eq!(total_revenue(&conn).unwrap(), 125_500.0);
    }

    #[test]
    fn processed_payment_is_persisted() {
        let mut conn = open_memory_database().unwrap();
        let id = visit(&mut conn, "Siti");

        let returned = process_payment(&conn, &id, &settle(50_000.0, PaymentMethod::Transfer)).unwrap();
        let stored = get_payment(&conn, &id).unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
        assert_eq!(stored.amount, 50_000.0);
        assert_eq!(stored.payment_method, PaymentMethod::Transfer);
        assert!(stored.paid_at.is_some());
        assert_eq!(stored.paid_at, returned.paid_at);
    }

    #[test]
    fn only_pending_payments_can_be_processed() {
        let mut conn = open_memory_database().unwrap();
        let id = visit(&mut conn, "Siti");
        process_payment(&conn, &id, &settle(10_000.0, PaymentMethod::Cash)).unwrap();

        let err = process_payment(&conn, &id, &settle(99_000.0, PaymentMethod::Cash)).unwrap_err();
        assert!(matches!(err, ClinicError::InvalidTransition { .. }));
        assert_eq!(total_revenue(&conn).unwrap(), 10_000.0);

        let err = process_payment(&conn, &Uuid::new_v4(), &settle(1.0, PaymentMethod::Cash)).unwrap_err();
        assert!(matches!(err, ClinicError::NotFound { entity: "payment", .. }));
    }

    #[test]
    fn concurrent_processing_settles_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("klinik.db");
        let mut conn = open_database(&path).unwrap();

        for round in 0..20 {
            let id = visit(&mut conn, &format!("Pasien {round}"));
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = [(50_000.0, PaymentMethod::Cash), (75_000.0, PaymentMethod::Debit)]
                .into_iter()
                .map(|(amount, method)| {
                    let path = path.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        let conn = open_database(&path).unwrap();
                        barrier.wait();
                        process_payment(&conn, &id, &settle(amount, method))
                    })
                })
                .collect();
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

            let settled: Vec<&Payment> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(settled.len(), 1, "round {round}");
            let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
            assert!(matches!(rejected, ClinicError::InvalidTransition { .. }));

            let stored = get_payment(&conn, &id).unwrap().unwrap();
            assert_eq!(stored.amount, settled[0].amount);
            assert_eq!(stored.payment_method, settled[0].payment_method);
        }
        assert_eq!(list_amounts_by_status(&conn, PaymentStatus::Completed).unwrap().len(), 20);
    }

    #[test]
    fn invalid_amounts_rejected() {
        let mut conn = open_memory_database().unwrap();
        let id = visit(&mut conn, "Siti");
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let err = process_payment(&conn, &id, &settle(amount, PaymentMethod::Cash)).unwrap_err();
            assert!(matches!(err, ClinicError::Validation(_)));
        }
        assert_eq!(get_payment(&conn, &id).unwrap().unwrap().status, PaymentStatus::Pending);
    }

    #[test]
    fn dashboard_lists_newest_first_with_names() {
        let mut conn = open_memory_database().unwrap();
        visit(&mut conn, "Siti");
        let newest = visit(&mut conn, "Budi");

        let dashboard = load(&conn).unwrap();
        assert_eq!(dashboard.payments.len(), 2);
        assert_eq!(dashboard.payments[0].payment.id, newest);
        assert_eq!(dashboard.payments[0].patient_name.as_deref(), Some("Budi"));
        assert_eq!(dashboard.pending_count, 2);
    }

    #[test]
    fn unknown_method_is_not_deserialized() {
        let err = serde_json::from_str::<ProcessPayment>(r#"{"amount": 1, "payment_method": "qris"}"#);
        assert!(err.is_err());
        let ok: ProcessPayment =
            serde_json::from_str(r#"{"amount": 50000, "payment_method": "credit"}"#).unwrap();
        assert_eq!(ok.payment_method, PaymentMethod::Credit);
    }
}
