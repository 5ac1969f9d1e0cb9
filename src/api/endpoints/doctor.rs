//! Doctor endpoints (role `dokter`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::dashboards::doctor::{
    self, ExaminationForm, ExaminationWithPatient, PrescriptionItemInput, QueueWithPatient,
    SubmittedExamination,
};
use crate::dashboards::today;
use crate::models::QueueEntry;

#[derive(Deserialize)]
pub struct SubmitExaminationRequest {
    #[serde(flatten)]
    pub form: ExaminationForm,
    #[serde(default)]
    pub items: Vec<PrescriptionItemInput>,
}

/// `GET /api/doctor/queue`: today's open queue.
pub async fn todays_queue(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<QueueWithPatient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(doctor::todays_queue(&conn, today())?))
}

/// `POST /api/doctor/queue/:id/start`
pub async fn start_examination(
    State(ctx): State<ApiContext>,
    Path(queue_id): Path<String>,
) -> Result<Json<QueueEntry>, ApiError> {
    let queue_id = parse_id(&queue_id, "queue")?;
    let conn = ctx.core.open_db()?;
    Ok(Json(doctor::start_examination(&conn, &queue_id)?))
}

/// `POST /api/doctor/queue/:id/examination`
pub async fn submit_examination(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Path(queue_id): Path<String>,
    Json(request): Json<SubmitExaminationRequest>,
) -> Result<(StatusCode, Json<SubmittedExamination>), ApiError> {
    let queue_id = parse_id(&queue_id, "queue")?;
    let mut conn = ctx.core.open_db()?;
    let submitted =
        doctor::submit_examination(&mut conn, &auth.profile, &queue_id, &request.form, &request.items)?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// `GET /api/doctor/examinations`: own last examinations.
pub async fn recent_examinations(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ExaminationWithPatient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(doctor::recent_examinations(&conn, &auth.profile.id)?))
}
