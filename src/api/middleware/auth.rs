//! Session middleware.
//!
//! `resolve_session` turns a session token into an `AuthContext` request
//! extension when the session is valid and passes every request on.
//! `require_auth` rejects requests that arrived without one.

use axum::http::{header, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{session_token, ApiContext, AuthContext};
use crate::auth::{current_profile, hash_token};
use crate::db::now_timestamp;

pub async fn resolve_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match resolve_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn resolve_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    if let Some(token) = session_token(req.headers()) {
        let token_hash = hash_token(&token);
        let profile = {
            let conn = ctx.core.open_db()?;
            current_profile(&conn, &token_hash, &now_timestamp())?
        };
        match profile {
            Some(profile) => {
                req.extensions_mut().insert(AuthContext { profile, token_hash });
            }
            None => tracing::debug!("Unknown or expired session token"),
        }
    }

    Ok(next.run(req).await)
}

/// Require a resolved session. Authenticated responses are marked uncacheable.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    if req.extensions().get::<AuthContext>().is_none() {
        return ApiError::Unauthorized.into_response();
    }
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
