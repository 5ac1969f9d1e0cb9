//! Seed helpers shared by unit tests.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::now_timestamp;
use crate::db::repository::{insert_patient, insert_profile};
use crate::models::enums::UserRole;
use crate::models::{Patient, Profile, ProfileCredentials};

pub fn seed_profile(conn: &Connection, role: UserRole, full_name: &str) -> Profile {
    let now = now_timestamp();
    let id = Uuid::new_v4();
    let profile = Profile {
        id,
        email: format!("{}@klinik.test", id.simple()),
        full_name: full_name.into(),
        role: role.as_str().into(),
        phone: None,
        created_at: now,
        updated_at: now,
    };
    let credentials = ProfileCredentials {
        profile_id: id,
        password_hash: "unused".into(),
        password_salt: "unused".into(),
    };
    insert_profile(conn, &profile, &credentials).unwrap();
    profile
}

pub fn seed_patient(conn: &Connection, full_name: &str) -> (Profile, Patient) {
    let profile = seed_profile(conn, UserRole::Patient, full_name);
    let now = now_timestamp();
    let patient = Patient {
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
    };
    insert_patient(conn, &patient).unwrap();
    (profile, patient)
}
