use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserRole;

/// Signed-in user as exposed by the session provider.
///
/// `role` is kept as the raw stored tag so that the role gate can report
/// an unrecognized tag instead of failing to load the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn user_role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }
}

/// Stored password material for a profile. Never serialized.
#[derive(Debug, Clone)]
pub struct ProfileCredentials {
    pub profile_id: Uuid,
    pub password_hash: String,
    pub password_salt: String,
}
