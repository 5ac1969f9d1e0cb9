//! Administration endpoints (role `petugas_administrasi`).

use axum::extract::{Path, State};
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboards::administration::{self, AdministrationDashboard, ProcessPayment};
use crate::models::Payment;

/// `GET /api/admin/payments`: payments with revenue and pending count.
pub async fn list_payments(
    State(ctx): State<ApiContext>,
) -> Result<Json<AdministrationDashboard>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(administration::load(&conn)?))
}

/// `POST /api/admin/payments/:id/process`
pub async fn process_payment(
    State(ctx): State<ApiContext>,
    Path(payment_id): Path<String>,
    Json(input): Json<ProcessPayment>,
) -> Result<Json<Payment>, ApiError> {
    let payment_id = parse_id(&payment_id, "payment")?;
    let conn = ctx.core.open_db()?;
    Ok(Json(administration::process_payment(&conn, &payment_id, &input)?))
}
