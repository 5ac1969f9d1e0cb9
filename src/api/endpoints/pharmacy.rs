//! Pharmacy endpoints (role `petugas_apotek`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboards::pharmacy::{self, NewStock, PrescriptionWithDetails, StockRow};
use crate::models::{MedicineStock, Prescription};

/// `GET /api/pharmacy/stock`
pub async fn list_stock(State(ctx): State<ApiContext>) -> Result<Json<Vec<StockRow>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(pharmacy::stock_overview(&conn)?))
}

/// `POST /api/pharmacy/stock`
pub async fn add_stock(
    State(ctx): State<ApiContext>,
    Json(input): Json<NewStock>,
) -> Result<(StatusCode, Json<MedicineStock>), ApiError> {
    let conn = ctx.core.open_db()?;
    Ok((StatusCode::CREATED, Json(pharmacy::add_stock(&conn, &input)?)))
}

/// `GET /api/pharmacy/prescriptions`
pub async fn list_prescriptions(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<PrescriptionWithDetails>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(pharmacy::list_prescriptions(&conn)?))
}

/// `POST /api/pharmacy/prescriptions/:id/fill`
pub async fn fill_prescription(
    State(ctx): State<ApiContext>,
    Path(prescription_id): Path<String>,
) -> Result<Json<Prescription>, ApiError> {
    let prescription_id = parse_id(&prescription_id, "prescription")?;
    let conn = ctx.core.open_db()?;
    Ok(Json(pharmacy::fill_prescription(&conn, &prescription_id)?))
}
