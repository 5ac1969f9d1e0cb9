//! Session provider: sign-up, sign-in, sign-out and current-profile lookup.
//!
//! Passwords are stored as PBKDF2-SHA256 hashes. Sessions are opaque bearer
//! tokens; only their SHA-256 digest is persisted in `auth_sessions`.

pub mod password;
pub mod token;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{
    delete_session, get_credentials_by_email, get_profile, get_profile_by_email, get_session,
    insert_patient, insert_profile, insert_session, StoredSession,
};
use crate::db::{now_timestamp, DatabaseError};
use crate::models::enums::UserRole;
use crate::models::{Patient, Profile, ProfileCredentials};

pub use password::{hash_password, verify_password};
pub use token::{generate_token, hash_token};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email is already registered")]
    EmailTaken,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    #[error("{0}")]
    Invalid(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for AuthError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Result of a successful sign-in. The token is shown to the client once.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Profile,
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.contains('.')
                && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AuthError::Invalid("Email address is not valid".into()))
    }
}

/// Register a new account. A patient account also gets its `patients` row,
/// written in the same transaction as the profile.
pub fn sign_up(conn: &mut Connection, request: &SignUpRequest) -> Result<Profile, AuthError> {
    let email = normalize_email(&request.email)?;
    let full_name = request.full_name.trim();
    if full_name.is_empty() {
        return Err(AuthError::Invalid("Full name is required".into()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }

    let now = now_timestamp();
    let profile = Profile {
        id: Uuid::new_v4(),
        email,
        full_name: full_name.to_string(),
        role: request.role.as_str().to_string(),
        phone: request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(String::from),
        created_at: now,
        updated_at: now,
    };
    let (password_hash, password_salt) = hash_password(&request.password);
    let credentials = ProfileCredentials {
        profile_id: profile.id,
        password_hash,
        password_salt,
    };

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if get_profile_by_email(&tx, &profile.email)?.is_some() {
        return Err(AuthError::EmailTaken);
    }
    insert_profile(&tx, &profile, &credentials).map_err(|e| {
        if e.is_constraint_violation() {
            AuthError::EmailTaken
        } else {
            AuthError::Database(e)
        }
    })?;
    if request.role == UserRole::Patient {
        insert_patient(&tx, &Patient {
            id: Uuid::new_v4(),
            profile_id: profile.id,
            date_of_birth: None,
            address: None,
            blood_type: None,
            allergies: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            created_at: now,
            updated_at: now,
        })?;
    }
    tx.commit()?;

    tracing::info!(profile_id = %profile.id, role = %profile.role, "Account registered");
    Ok(profile)
}

/// Verify credentials and open a session lasting `ttl`.
///
/// Unknown email and wrong password fail with the same error.
pub fn sign_in(
    conn: &Connection,
    request: &SignInRequest,
    ttl: Duration,
) -> Result<SignedIn, AuthError> {
    let email = request.email.trim().to_lowercase();
    let credentials = get_credentials_by_email(conn, &email)?.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&request.password, &credentials.password_hash, &credentials.password_salt) {
        tracing::warn!("Sign-in rejected");
        return Err(AuthError::InvalidCredentials);
    }
    let profile = get_profile(conn, &credentials.profile_id)?.ok_or(AuthError::InvalidCredentials)?;

    let token = generate_token();
    let now = now_timestamp();
    let session = StoredSession {
        token_hash: hash_token(&token),
        profile_id: profile.id,
        created_at: now,
        expires_at: now + ttl,
    };
    insert_session(conn, &session)?;

    tracing::info!(profile_id = %profile.id, "Session opened");
    Ok(SignedIn {
        token,
        expires_at: session.expires_at,
        profile,
    })
}

/// End the session for `token_hash`. Signing out twice is not an error.
pub fn sign_out(conn: &Connection, token_hash: &str) -> Result<(), AuthError> {
    if delete_session(conn, token_hash)? {
        tracing::info!("Session closed");
    }
    Ok(())
}

/// Resolve the profile behind a session. Expired sessions are removed and
/// resolve to `None`.
pub fn current_profile(
    conn: &Connection,
    token_hash: &str,
    now: &DateTime<Utc>,
) -> Result<Option<Profile>, AuthError> {
    let Some(session) = get_session(conn, token_hash)? else {
        return Ok(None);
    };
    if session.expires_at <= *now {
        delete_session(conn, token_hash)?;
        tracing::debug!(profile_id = %session.profile_id, "Expired session removed");
        return Ok(None);
    }
    Ok(get_profile(conn, &session.profile_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::get_patient_by_profile;
    use crate::db::sqlite::open_memory_database;

    fn request(email: &str, role: UserRole) -> SignUpRequest {
        SignUpRequest {
            email: email.into(),
            password: "rahasia123".into(),
            full_name: "Siti Aminah".into(),
            role,
            phone: Some(" 0812 ".into()),
        }
    }

    fn sign_in_request(email: &str, password: &str) -> SignInRequest {
        SignInRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn patient_sign_up_creates_patient_row() {
        let mut conn = open_memory_database().unwrap();
        let profile = sign_up(&mut conn, &request("Siti@Example.com", UserRole::Patient)).unwrap();

        assert_eq!(profile.email, "siti@example.com");
        assert_eq!(profile.user_role(), Some(UserRole::Patient));
        assert_eq!(profile.phone.as_deref(), Some("0812"));
        assert!(get_patient_by_profile(&conn, &profile.id).unwrap().is_some());
    }

    #[test]
    fn staff_sign_up_has_no_patient_row() {
        let mut conn = open_memory_database().unwrap();
        let profile = sign_up(&mut conn, &request("dokter@example.com", UserRole::Doctor)).unwrap();
        assert!(get_patient_by_profile(&conn, &profile.id).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let mut conn = open_memory_database().unwrap();
        sign_up(&mut conn, &request("siti@example.com", UserRole::Patient)).unwrap();
        let err = sign_up(&mut conn, &request("SITI@example.com", UserRole::Doctor)).unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn sign_up_validation() {
        let mut conn = open_memory_database().unwrap();
        let mut weak = request("a@example.com", UserRole::Patient);
        weak.password = "12345".into();
        assert!(matches!(sign_up(&mut conn, &weak).unwrap_err(), AuthError::WeakPassword));

        let mut nameless = request("a@example.com", UserRole::Patient);
        nameless.full_name = "   ".into();
        assert!(matches!(sign_up(&mut conn, &nameless).unwrap_err(), AuthError::Invalid(_)));

        for email in ["", "no-at-sign", "@example.com", "a@localhost", "a@b@c.com"] {
            let err = sign_up(&mut conn, &request(email, UserRole::Patient)).unwrap_err();
            assert!(matches!(err, AuthError::Invalid(_)), "accepted {email:?}");
        }
    }

    #[test]
    fn sign_in_round_trip() {
        let mut conn = open_memory_database().unwrap();
        let profile = sign_up(&mut conn, &request("siti@example.com", UserRole::Patient)).unwrap();

        let signed_in = sign_in(&conn, &sign_in_request("siti@example.com", "rahasia123"), Duration::hours(12)).unwrap();
        assert_eq!(signed_in.profile.id, profile.id);

        let hash = hash_token(&signed_in.token);
        let current = current_profile(&conn, &hash, &now_timestamp()).unwrap().unwrap();
        assert_eq!(current.id, profile.id);

        sign_out(&conn, &hash).unwrap();
        assert!(current_profile(&conn, &hash, &now_timestamp()).unwrap().is_none());
        sign_out(&conn, &hash).unwrap();
    }

    #[test]
    fn wrong_password_and_unknown_email_look_the_same() {
        let mut conn = open_memory_database().unwrap();
        sign_up(&mut conn, &request("siti@example.com", UserRole::Patient)).unwrap();

        let wrong = sign_in(&conn, &sign_in_request("siti@example.com", "salah"), Duration::hours(1)).unwrap_err();
        let unknown = sign_in(&conn, &sign_in_request("budi@example.com", "rahasia123"), Duration::hours(1)).unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[test]
    fn expired_session_resolves_to_none_and_is_removed() {
        let mut conn = open_memory_database().unwrap();
        sign_up(&mut conn, &request("siti@example.com", UserRole::Patient)).unwrap();
        let signed_in = sign_in(&conn, &sign_in_request("siti@example.com", "rahasia123"), Duration::hours(1)).unwrap();
        let hash = hash_token(&signed_in.token);

        let later = now_timestamp() + Duration::hours(2);
        assert!(current_profile(&conn, &hash, &later).unwrap().is_none());
        assert!(get_session(&conn, &hash).unwrap().is_none());
    }
}
