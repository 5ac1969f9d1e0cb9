//! Repository layer: table-scoped database operations.
//!
//! Each sub-module owns the SQL for one table. Row mappers that take a
//! column offset are `pub(crate)` so joined dashboard queries can reuse them.

mod audit;
mod examination;
mod feedback;
mod patient;
mod payment;
mod prescription;
mod profile;
mod queue;
mod session;
mod stock;

pub use audit::*;
pub use examination::*;
pub use feedback::*;
pub use patient::*;
pub use payment::*;
pub use prescription::*;
pub use profile::*;
pub use queue::*;
pub use session::*;
pub use stock::*;

pub(crate) use examination::{examination_from_row, EXAMINATION_COLUMNS};
pub(crate) use patient::{patient_from_row, PATIENT_COLUMNS};
pub(crate) use payment::{payment_from_row, PAYMENT_COLUMNS};
pub(crate) use prescription::{prescription_from_row, PRESCRIPTION_COLUMNS};
pub(crate) use profile::{profile_from_row, PROFILE_COLUMNS};
pub(crate) use queue::{queue_entry_from_row, QUEUE_COLUMNS};

/// Prefix every column of a column list with a table alias, for joins.
pub(crate) fn qualified(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|column| format!("{alias}.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
