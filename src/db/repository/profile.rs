use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::row::{timestamp_at, uuid_at};
use crate::db::{format_timestamp, DatabaseError};
use crate::models::{Profile, ProfileCredentials};

pub(crate) const PROFILE_COLUMNS: &str =
    "id, email, full_name, role, phone, created_at, updated_at";

/// Map a profile starting at column `offset`.
pub(crate) fn profile_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: uuid_at(row, offset)?,
        email: row.get(offset + 1)?,
        full_name: row.get(offset + 2)?,
        role: row.get(offset + 3)?,
        phone: row.get(offset + 4)?,
        created_at: timestamp_at(row, offset + 5)?,
        updated_at: timestamp_at(row, offset + 6)?,
    })
}

pub fn insert_profile(
    conn: &Connection,
    profile: &Profile,
    credentials: &ProfileCredentials,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO profiles (id, email, full_name, role, phone, password_hash, password_salt,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            profile.id.to_string(),
            profile.email,
            profile.full_name,
            profile.role,
            profile.phone,
            credentials.password_hash,
            credentials.password_salt,
            format_timestamp(&profile.created_at),
            format_timestamp(&profile.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, id: &Uuid) -> Result<Option<Profile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![id.to_string()],
            |row| profile_from_row(row, 0),
        )
        .optional()?;
    Ok(profile)
}

/// Emails are matched case-insensitively; they are stored lowercased.
pub fn get_profile_by_email(conn: &Connection, email: &str) -> Result<Option<Profile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?1"),
            params![email.to_lowercase()],
            |row| profile_from_row(row, 0),
        )
        .optional()?;
    Ok(profile)
}

pub fn get_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<ProfileCredentials>, DatabaseError> {
    let credentials = conn
        .query_row(
            "SELECT id, password_hash, password_salt FROM profiles WHERE email = ?1",
            params![email.to_lowercase()],
            |row| {
                Ok(ProfileCredentials {
                    profile_id: uuid_at(row, 0)?,
                    password_hash: row.get(1)?,
                    password_salt: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(credentials)
}
