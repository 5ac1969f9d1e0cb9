//! HTTP router.
//!
//! Public pages and account routes sit next to five role-scoped groups
//! under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Session resolver → 2. Rate limiter → 3. Audit logger
//! then per group: auth guard → role guard → handler.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::models::enums::UserRole;

/// Build the application router over shared state.
pub fn clinic_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Build the router from a pre-constructed `ApiContext`.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn build_router(ctx: ApiContext) -> Router {
    let public = Router::new()
        .route("/", get(endpoints::pages::landing))
        .route("/auth", get(endpoints::pages::sign_in))
        .route("/dashboard", get(endpoints::pages::dashboard))
        .route("/api/health", get(endpoints::health::check))
        .route("/api/auth/sign-up", post(endpoints::auth::sign_up))
        .route("/api/auth/sign-in", post(endpoints::auth::sign_in))
        .route("/api/auth/sign-out", post(endpoints::auth::sign_out))
        .route("/api/auth/session", get(endpoints::auth::session));

    let patient = Router::new()
        .route(
            "/api/patient/queue",
            get(endpoints::patient::queue_history).post(endpoints::patient::register_queue),
        )
        .route("/api/patient/examinations", get(endpoints::patient::examinations))
        .route("/api/patient/feedback", post(endpoints::patient::submit_feedback))
        .route_layer(from_fn_with_state(UserRole::Patient, middleware::role::require_role));

    let doctor = Router::new()
        .route("/api/doctor/queue", get(endpoints::doctor::todays_queue))
        .route("/api/doctor/queue/:id/start", post(endpoints::doctor::start_examination))
        .route(
            "/api/doctor/queue/:id/examination",
            post(endpoints::doctor::submit_examination),
        )
        .route("/api/doctor/examinations", get(endpoints::doctor::recent_examinations))
        .route_layer(from_fn_with_state(UserRole::Doctor, middleware::role::require_role));

    let pharmacy = Router::new()
        .route(
            "/api/pharmacy/stock",
            get(endpoints::pharmacy::list_stock).post(endpoints::pharmacy::add_stock),
        )
        .route("/api/pharmacy/prescriptions", get(endpoints::pharmacy::list_prescriptions))
        .route(
            "/api/pharmacy/prescriptions/:id/fill",
            post(endpoints::pharmacy::fill_prescription),
        )
        .route_layer(from_fn_with_state(UserRole::PharmacyStaff, middleware::role::require_role));

    let administration = Router::new()
        .route("/api/admin/payments", get(endpoints::administration::list_payments))
        .route(
            "/api/admin/payments/:id/process",
            post(endpoints::administration::process_payment),
        )
        .route_layer(from_fn_with_state(UserRole::AdminStaff, middleware::role::require_role));

    let owner = Router::new()
        .route("/api/owner/summary", get(endpoints::owner::summary))
        .route_layer(from_fn_with_state(UserRole::ClinicOwner, middleware::role::require_role));

    let protected = Router::new()
        .merge(patient)
        .merge(doctor)
        .merge(pharmacy)
        .merge(administration)
        .merge(owner)
        .route_layer(from_fn(middleware::auth::require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // Layers are applied from bottom (innermost) to top (outermost).
    // Extension must be outermost so all middleware can access ApiContext.
    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::rate::limit))
        .layer(from_fn(middleware::auth::resolve_session))
        .layer(axum::Extension(ctx))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
