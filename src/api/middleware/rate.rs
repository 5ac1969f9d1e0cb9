//! Per-client rate limiting middleware.
//!
//! Applies sliding-window rate limits per client:
//! - 100 requests per minute
//! - 1000 requests per hour
//!
//! Runs after the session resolver. A resolved session is limited per
//! profile; everything else is limited per peer address, so an unknown
//! token gets no bucket of its own.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};

fn rate_key(req: &Request<axum::body::Body>) -> String {
    if let Some(auth) = req.extensions().get::<AuthContext>() {
        return format!("profile:{}", auth.profile.id);
    }
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("peer:{}", addr.ip()),
        None => "peer:unknown".to_string(),
    }
}

/// Returns 429 if the client is over its limit.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&req);

    // The guard is !Send, so it is dropped before awaiting.
    {
        let mut limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter
            .check(&key)
            .map_err(|retry_after| {
                tracing::warn!(%key, retry_after, "Rate limit exceeded");
                ApiError::RateLimited { retry_after }
            })?;
    }

    Ok(next.run(req).await)
}
