//! Pharmacy dashboard: medicine stock and prescription filling.
//!
//! Filling a prescription does not touch stock quantities.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, ClinicError};
use crate::db::now_timestamp;
use crate::db::repository::{
    get_prescription, insert_stock, list_prescription_items, list_stock, prescription_from_row,
    qualified, update_prescription_status, PRESCRIPTION_COLUMNS,
};
use crate::models::enums::PrescriptionStatus;
use crate::models::{MedicineStock, Prescription, PrescriptionItem};

#[derive(Debug, Clone, Serialize)]
pub struct StockRow {
    #[serde(flatten)]
    pub stock: MedicineStock,
    pub low_stock: bool,
}

/// A stock intake as entered by pharmacy staff.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStock {
    pub medicine_name: String,
    pub quantity: i64,
    pub unit: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionWithDetails {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub items: Vec<PrescriptionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PharmacyDashboard {
    pub stock: Vec<StockRow>,
    pub prescriptions: Vec<PrescriptionWithDetails>,
    pub total_medicines: usize,
    pub low_stock_count: usize,
    pub pending_prescriptions: usize,
}

pub fn stock_overview(conn: &Connection) -> Result<Vec<StockRow>, ClinicError> {
    let rows = list_stock(conn)?
        .into_iter()
        .map(|stock| StockRow {
            low_stock: stock.is_low_stock(),
            stock,
        })
        .collect();
    Ok(rows)
}

/// Insert a stock row. Rows with the same medicine name are kept separate.
pub fn add_stock(conn: &Connection, input: &NewStock) -> Result<MedicineStock, ClinicError> {
    let medicine_name = input.medicine_name.trim();
    let unit = input.unit.trim();
    if medicine_name.is_empty() || unit.is_empty() {
        return Err(ClinicError::Validation("Medicine name and unit are required".into()));
    }
    if input.quantity < 0 {
        return Err(ClinicError::Validation("Quantity cannot be negative".into()));
    }
    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            return Err(ClinicError::Validation("Price must be a non-negative number".into()));
        }
    }

    let now = now_timestamp();
    let stock = MedicineStock {
        id: Uuid::new_v4(),
        medicine_name: medicine_name.to_string(),
        quantity: input.quantity,
        unit: unit.to_string(),
        price: input.price,
        supplier: non_blank(input.supplier.as_deref()),
        expiry_date: input.expiry_date,
        created_at: now,
        updated_at: now,
    };
    insert_stock(conn, &stock)?;
    tracing::info!(medicine = %stock.medicine_name, quantity = stock.quantity, "Stock added");
    Ok(stock)
}

/// All prescriptions, newest first, with names and items.
pub fn list_prescriptions(conn: &Connection) -> Result<Vec<PrescriptionWithDetails>, ClinicError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, pp.full_name, d.full_name
         FROM prescriptions rx
         LEFT JOIN patients p ON p.id = rx.patient_id
         LEFT JOIN profiles pp ON pp.id = p.profile_id
         LEFT JOIN profiles d ON d.id = rx.doctor_id
         ORDER BY rx.created_at DESC, rx.rowid DESC",
        qualified(PRESCRIPTION_COLUMNS, "rx")
    ))?;
    let headers = stmt
        .query_map([], |row| {
            Ok((prescription_from_row(row, 0)?, row.get(8)?, row.get(9)?))
        })?
        .collect::<Result<Vec<(Prescription, Option<String>, Option<String>)>, _>>()?;

    headers
        .into_iter()
        .map(|(prescription, patient_name, doctor_name)| -> Result<_, ClinicError> {
            let items = list_prescription_items(conn, &prescription.id)?;
            Ok(PrescriptionWithDetails {
                prescription,
                patient_name,
                doctor_name,
                items,
            })
        })
        .collect()
}

/// Mark a prescription filled. Filling an already filled one is a no-op success.
pub fn fill_prescription(conn: &Connection, id: &Uuid) -> Result<Prescription, ClinicError> {
    if get_prescription(conn, id)?.is_none() {
        return Err(ClinicError::NotFound { entity: "prescription", id: *id });
    }
    update_prescription_status(conn, id, PrescriptionStatus::Filled)?;
    let filled = get_prescription(conn, id)?.ok_or(ClinicError::NotFound {
        entity: "prescription",
        id: *id,
    })?;
    tracing::info!(prescription_id = %id, "Prescription filled");
    Ok(filled)
}

pub fn load(conn: &Connection) -> Result<PharmacyDashboard, ClinicError> {
    let stock = stock_overview(conn)?;
    let prescriptions = list_prescriptions(conn)?;
    Ok(PharmacyDashboard {
        total_medicines: stock.len(),
        low_stock_count: stock.iter().filter(|s| s.low_stock).count(),
        pending_prescriptions: prescriptions
            .iter()
            .filter(|p| p.prescription.status == PrescriptionStatus::Pending)
            .count(),
        stock,
        prescriptions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::doctor::{submit_examination, ExaminationForm, PrescriptionItemInput};
    use crate::dashboards::patient::register_queue;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::UserRole;
    use crate::test_support::{seed_patient, seed_profile};
    use rusqlite::params;

    fn intake(name: &str, quantity: i64) -> NewStock {
        NewStock {
            medicine_name: name.into(),
            quantity,
            unit: "tablet".into(),
            price: Some(1_500.0),
            supplier: Some("PT Kimia Farma".into()),
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 30),
        }
    }

    fn prescribe(conn: &mut Connection) -> Uuid {
        let doctor = seed_profile(conn, UserRole::Doctor, "dr. Andi");
        let (siti, _) = seed_patient(conn, "Siti");
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entry = register_queue(conn, &siti, "Demam", day).unwrap();
        let form = ExaminationForm { diagnosis: "Demam".into(), ..Default::default() };
        let item = PrescriptionItemInput {
            medicine_name: "Paracetamol".into(),
            dosage: "500mg".into(),
            frequency: "3x sehari".into(),
            duration: "3 hari".into(),
            instructions: None,
        };
        submit_examination(conn, &doctor, &entry.id, &form, &[item])
            .unwrap()
            .prescription
            .unwrap()
            .id
    }

    #[test]
    fn low_stock_boundary_is_ten() {
        let conn = open_memory_database().unwrap();
        let nine = add_stock(&conn, &intake("Amoxicillin", 9)).unwrap();
        add_stock(&conn, &intake("Paracetamol", 10)).unwrap();

        let dashboard = load(&conn).unwrap();
        assert_eq!(dashboard.total_medicines, 2);
        assert_eq!(dashboard.low_stock_count, 1);
        assert!(dashboard.stock[0].low_stock);
        assert!(!dashboard.stock[1].low_stock);

        conn.execute(
            "UPDATE medicine_stock SET quantity = 10 WHERE id = ?1",
            params![nine.id.to_string()],
        )
        .unwrap();
        assert_eq!(load(&conn).unwrap().low_stock_count, 0);
    }

    #[test]
    fn duplicate_names_are_separate_rows() {
        let conn = open_memory_database().unwrap();
        add_stock(&conn, &intake("Paracetamol", 20)).unwrap();
        add_stock(&conn, &intake("Paracetamol", 30)).unwrap();
        assert_eq!(stock_overview(&conn).unwrap().len(), 2);
    }

    #[test]
    fn invalid_stock_rejected() {
        let conn = open_memory_database().unwrap();
        let cases = [
            intake("Paracetamol", -1),
            NewStock { price: Some(-5.0), ..intake("Paracetamol", 1) },
            NewStock { price: Some(f64::NAN), ..intake("Paracetamol", 1) },
            intake("  ", 1),
            NewStock { unit: String::new(), ..intake("Paracetamol", 1) },
        ];
        for case in &cases {
            assert!(matches!(add_stock(&conn, case).unwrap_err(), ClinicError::Validation(_)));
        }
        assert!(stock_overview(&conn).unwrap().is_empty());
    }

    #[test]
    fn prescriptions_listed_with_names_and_items() {
        let mut conn = open_memory_database().unwrap();
        let id = prescribe(&mut conn);

        let listed = list_prescriptions(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].prescription.id, id);
        assert_eq!(listed[0].patient_name.as_deref(), Some("Siti"));
        assert_eq!(listed[0].doctor_name.as_deref(), Some("dr. Andi"));
        assert_eq!(listed[0].items.len(), 1);
        assert_eq!(load(&conn).unwrap().pending_prescriptions, 1);
    }

    #[test]
    fn filling_twice_succeeds() {
        let mut conn = open_memory_database().unwrap();
        let id = prescribe(&mut conn);

        assert_eq!(fill_prescription(&conn, &id).unwrap().status, PrescriptionStatus::Filled);
        assert_eq!(fill_prescription(&conn, &id).unwrap().status, PrescriptionStatus::Filled);
        assert_eq!(load(&conn).unwrap().pending_prescriptions, 0);
    }

    #[test]
    fn filling_unknown_prescription_fails() {
        let conn = open_memory_database().unwrap();
        let err = fill_prescription(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ClinicError::NotFound { entity: "prescription", .. }));
    }
}
