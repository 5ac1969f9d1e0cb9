//! Account endpoints.
//!
//! - `POST /api/auth/sign-up`
//! - `POST /api/auth/sign-in`: returns the token and sets the session cookie
//! - `POST /api/auth/sign-out`: idempotent, clears the cookie
//! - `GET /api/auth/session`: current profile and where the gate sends it

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::endpoints::run_blocking;
use crate::api::error::ApiError;
use crate::api::types::{session_token, ApiContext, AuthContext, SESSION_COOKIE};
use crate::auth::{self, SignInRequest, SignUpRequest};
use crate::gate::{self, GateOutcome, SessionView};
use crate::models::Profile;

/// `POST /api/auth/sign-up`
pub async fn sign_up(
    State(ctx): State<ApiContext>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let core = ctx.core.clone();
    let profile = run_blocking(move || {
        let mut conn = core.open_db()?;
        Ok(auth::sign_up(&mut conn, &request)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /api/auth/sign-in`
pub async fn sign_in(
    State(ctx): State<ApiContext>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let core = ctx.core.clone();
    let ttl = core.session_ttl();
    let signed_in = run_blocking(move || {
        let conn = core.open_db()?;
        Ok(auth::sign_in(&conn, &request, ttl)?)
    })
    .await?;

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        signed_in.token,
        ttl.num_seconds()
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(signed_in)))
}

/// `POST /api/auth/sign-out`
pub async fn sign_out(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        let conn = ctx.core.open_db()?;
        auth::sign_out(&conn, &auth::hash_token(&token))?;
    }
    let cleared = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cleared)]))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub profile: Option<Profile>,
    pub gate: GateOutcome,
}

/// `GET /api/auth/session`
pub async fn session(auth: Option<Extension<AuthContext>>) -> Json<SessionResponse> {
    let profile = auth.map(|Extension(auth)| auth.profile);
    let gate = gate::route(SessionView::resolved(profile.as_ref()));
    Json(SessionResponse { profile, gate })
}
