//! Owner endpoint (role `pemilik_klinik`).

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboards::owner::{self, OwnerDashboard};

/// `GET /api/owner/summary`
pub async fn summary(State(ctx): State<ApiContext>) -> Result<Json<OwnerDashboard>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(owner::load(&conn)?))
}
