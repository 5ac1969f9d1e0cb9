//! Role dashboards: per-role snapshots and the mutations each role may run.
//!
//! Every function takes a plain `&Connection` (or `&mut Connection` when it
//! needs a write transaction) so handlers and tests drive them the same way.

pub mod administration;
pub mod doctor;
pub mod owner;
pub mod patient;
pub mod pharmacy;

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::Profile;

/// Number of rows shown in "recent" lists.
pub const RECENT_LIMIT: i64 = 10;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("No patient record for profile {0}")]
    PatientNotFound(Uuid),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{0}")]
    Validation(String),

    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}

impl From<rusqlite::Error> for ClinicError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}

/// Calendar date used for queue numbering and the doctor's daily queue (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Trimmed copy of optional free text; blank becomes `None`.
pub(crate) fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(String::from)
}

/// Fetch result for whichever dashboard the role owns.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", content = "data")]
pub enum DashboardSnapshot {
    #[serde(rename = "pasien")]
    Patient(patient::PatientDashboard),
    #[serde(rename = "dokter")]
    Doctor(doctor::DoctorDashboard),
    #[serde(rename = "petugas_apotek")]
    Pharmacy(pharmacy::PharmacyDashboard),
    #[serde(rename = "petugas_administrasi")]
    Administration(administration::AdministrationDashboard),
    #[serde(rename = "pemilik_klinik")]
    Owner(owner::OwnerDashboard),
}

/// Load the dashboard for `role`.
pub fn load_dashboard(
    conn: &Connection,
    role: UserRole,
    profile: &Profile,
    today: NaiveDate,
) -> Result<DashboardSnapshot, ClinicError> {
    let snapshot = match role {
        UserRole::Patient => DashboardSnapshot::Patient(patient::load(conn, profile, today)?),
        UserRole::Doctor => DashboardSnapshot::Doctor(doctor::load(conn, profile, today)?),
        UserRole::PharmacyStaff => DashboardSnapshot::Pharmacy(pharmacy::load(conn)?),
        UserRole::AdminStaff => DashboardSnapshot::Administration(administration::load(conn)?),
        UserRole::ClinicOwner => DashboardSnapshot::Owner(owner::load(conn)?),
    };
    Ok(snapshot)
}
