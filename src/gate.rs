//! Role gate: decides what a session gets to see.

use serde::Serialize;

use crate::models::enums::UserRole;
use crate::models::Profile;

pub const SIGN_IN_PATH: &str = "/auth";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Session state as seen by the gate.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub profile: Option<&'a Profile>,
    pub loading: bool,
}

impl<'a> SessionView<'a> {
    pub fn resolved(profile: Option<&'a Profile>) -> Self {
        Self { profile, loading: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "role", rename_all = "snake_case")]
pub enum GateOutcome {
    Loading,
    RedirectToSignIn,
    Dashboard(UserRole),
    RoleNotRecognized,
}

/// Gate for the dashboard page.
pub fn route(session: SessionView<'_>) -> GateOutcome {
    if session.loading {
        return GateOutcome::Loading;
    }
    match session.profile {
        None => GateOutcome::RedirectToSignIn,
        Some(profile) => match profile.user_role() {
            Some(role) => GateOutcome::Dashboard(role),
            None => GateOutcome::RoleNotRecognized,
        },
    }
}

/// Where the landing and sign-in pages should send an already signed-in
/// session, if anywhere.
pub fn landing(session: SessionView<'_>) -> Option<&'static str> {
    match (session.loading, session.profile) {
        (false, Some(_)) => Some(DASHBOARD_PATH),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::now_timestamp;
    use uuid::Uuid;

    fn profile(role: &str) -> Profile {
        let now = now_timestamp();
        Profile {
            id: Uuid::new_v4(),
            email: "x@klinik.test".into(),
            full_name: "X".into(),
            role: role.into(),
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn loading_wins_over_everything() {
        let p = profile("dokter");
        assert_eq!(route(SessionView { profile: Some(&p), loading: true }), GateOutcome::Loading);
        assert_eq!(route(SessionView { profile: None, loading: true }), GateOutcome::Loading);
    }

    #[test]
    fn no_profile_redirects_to_sign_in() {
        assert_eq!(route(SessionView::resolved(None)), GateOutcome::RedirectToSignIn);
    }

    #[test]
    fn every_role_reaches_its_dashboard() {
        for role in UserRole::ALL {
            let p = profile(role.as_str());
            assert_eq!(route(SessionView::resolved(Some(&p))), GateOutcome::Dashboard(role));
        }
    }

    #[test]
    fn unknown_role_is_reported() {
        let p = profile("perawat");
        assert_eq!(route(SessionView::resolved(Some(&p))), GateOutcome::RoleNotRecognized);
    }

    #[test]
    fn landing_redirects_only_signed_in_sessions() {
        let p = profile("pasien");
        assert_eq!(landing(SessionView::resolved(Some(&p))), Some(DASHBOARD_PATH));
        assert_eq!(landing(SessionView::resolved(None)), None);
        assert_eq!(landing(SessionView { profile: Some(&p), loading: true }), None);
    }

    #[test]
    fn outcome_serializes_with_role_tag() {
        let json = serde_json::to_value(GateOutcome::Dashboard(UserRole::PharmacyStaff)).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "dashboard", "role": "petugas_apotek"}));
        let json = serde_json::to_value(GateOutcome::RoleNotRecognized).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "role_not_recognized"}));
    }
}
