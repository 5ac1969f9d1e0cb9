//! Audit logging middleware.
//!
//! Logs every request with the caller, method, path and response status.
//! Runs after the session resolver so the profile is known.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{ApiContext, AuthContext};
use crate::core_state::AccessSource;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let ctx = req.extensions().get::<ApiContext>().cloned();

    let source = req
        .extensions()
        .get::<AuthContext>()
        .map(|auth| AccessSource::Profile {
            profile_id: auth.profile.id.to_string(),
            role: auth.profile.role.clone(),
        })
        .unwrap_or(AccessSource::Anonymous);

    let response = next.run(req).await;

    if let Some(ctx) = ctx {
        let status = response.status().as_u16();
        ctx.core
            .log_access(source, &format!("{method} {path}"), &format!("status:{status}"));
    }

    response
}
