//! Role guard for dashboard route groups.

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::AuthContext;
use crate::models::enums::UserRole;

/// Only let through profiles whose role is `required`.
///
/// Mounted with `from_fn_with_state(UserRole::X, require_role)` inside
/// `require_auth`, so a missing `AuthContext` here is still a 401.
pub async fn require_role(
    State(required): State<UserRole>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(auth) = req.extensions().get::<AuthContext>() else {
        return ApiError::Unauthorized.into_response();
    };
    if auth.profile.user_role() != Some(required) {
        tracing::warn!(
            profile_id = %auth.profile.id,
            role = %auth.profile.role,
            required = %required,
            "Role check failed"
        );
        return ApiError::Forbidden(format!("This area is for {}", required.label())).into_response();
    }
    next.run(req).await
}
