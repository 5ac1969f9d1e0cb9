//! Patient endpoints (role `pasien`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::dashboards::patient::{self, ExaminationWithDoctor};
use crate::dashboards::today;
use crate::models::{PatientFeedback, QueueEntry};

#[derive(Deserialize)]
pub struct RegisterQueueRequest {
    pub complaint: String,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub rating: i32,
    #[serde(default)]
    pub feedback_text: Option<String>,
}

/// `GET /api/patient/queue`: own queue history, newest first.
pub async fn queue_history(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<QueueEntry>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let record = patient::patient_for_profile(&conn, &auth.profile)?;
    Ok(Json(patient::queue_history(&conn, &record.id)?))
}

/// `POST /api/patient/queue`: take a number for today.
pub async fn register_queue(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RegisterQueueRequest>,
) -> Result<(StatusCode, Json<QueueEntry>), ApiError> {
    let mut conn = ctx.core.open_db()?;
    let entry = patient::register_queue(&mut conn, &auth.profile, &request.complaint, today())?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /api/patient/examinations`
pub async fn examinations(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ExaminationWithDoctor>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let record = patient::patient_for_profile(&conn, &auth.profile)?;
    Ok(Json(patient::examination_history(&conn, &record.id)?))
}

/// `POST /api/patient/feedback`
pub async fn submit_feedback(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<PatientFeedback>), ApiError> {
    let conn = ctx.core.open_db()?;
    let feedback = patient::submit_feedback(
        &conn,
        &auth.profile,
        request.rating,
        request.feedback_text.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(feedback)))
}
