//! Page routes: landing, sign-in and the role-gated dashboard.
//!
//! Pages answer with a JSON descriptor of what to render, or a 303
//! redirect when the session belongs elsewhere.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::config::APP_NAME;
use crate::dashboards::{self, DashboardSnapshot};
use crate::gate::{self, GateOutcome, SessionView, SIGN_IN_PATH};
use crate::models::enums::UserRole;
use crate::models::Profile;

#[derive(Serialize)]
pub struct RoleOption {
    pub role: UserRole,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct PublicPage {
    pub page: &'static str,
    pub app: &'static str,
    pub roles: Vec<RoleOption>,
}

#[derive(Serialize)]
pub struct DashboardPage {
    pub gate: GateOutcome,
    pub profile: Profile,
    pub dashboard: Option<DashboardSnapshot>,
}

fn public_page(page: &'static str, auth: Option<Extension<AuthContext>>) -> Response {
    let profile = auth.map(|Extension(auth)| auth.profile);
    if let Some(path) = gate::landing(SessionView::resolved(profile.as_ref())) {
        return Redirect::to(path).into_response();
    }
    Json(PublicPage {
        page,
        app: APP_NAME,
        roles: UserRole::ALL
            .into_iter()
            .map(|role| RoleOption { role, label: role.label() })
            .collect(),
    })
    .into_response()
}

/// `GET /`
pub async fn landing(auth: Option<Extension<AuthContext>>) -> Response {
    public_page("landing", auth)
}

/// `GET /auth`
pub async fn sign_in(auth: Option<Extension<AuthContext>>) -> Response {
    public_page("sign_in", auth)
}

/// `GET /dashboard`
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    auth: Option<Extension<AuthContext>>,
) -> Result<Response, ApiError> {
    let profile = auth.map(|Extension(auth)| auth.profile);
    let outcome = gate::route(SessionView::resolved(profile.as_ref()));
    let Some(profile) = profile else {
        return Ok(Redirect::to(SIGN_IN_PATH).into_response());
    };

    let dashboard = match outcome {
        GateOutcome::Dashboard(role) => {
            let conn = ctx.core.open_db()?;
            Some(dashboards::load_dashboard(&conn, role, &profile, dashboards::today())?)
        }
        GateOutcome::RoleNotRecognized | GateOutcome::Loading | GateOutcome::RedirectToSignIn => None,
    };

    Ok(Json(DashboardPage {
        gate: outcome,
        profile,
        dashboard,
    })
    .into_response())
}
