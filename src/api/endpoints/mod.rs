//! Endpoint handlers.
//!
//! One module per dashboard plus the public pages and account routes.
//! Handlers open a connection per request and call into `dashboards`.

pub mod administration;
pub mod auth;
pub mod doctor;
pub mod health;
pub mod owner;
pub mod pages;
pub mod patient;
pub mod pharmacy;

use uuid::Uuid;

use crate::api::error::ApiError;

/// Parse a path id, reporting which entity it was meant to identify.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid {entity} ID: {e}")))
}

/// Run CPU-heavy work (password hashing) off the async workers.
pub(crate) async fn run_blocking<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
