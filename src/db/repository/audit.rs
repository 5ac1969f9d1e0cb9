use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// One row of the request audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: String,
    pub source: String,
    pub action: String,
    pub entity: String,
    pub profile_id: Option<String>,
}

/// Insert a batch of audit entries into the audit_log table.
pub fn insert_audit_entries(conn: &Connection, entries: &[AuditRecord]) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO audit_log (timestamp, source, action, entity, profile_id) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for entry in entries {
        stmt.execute(params![
            entry.timestamp,
            entry.source,
            entry.action,
            entry.entity,
            entry.profile_id
        ])?;
    }
    Ok(())
}

/// Prune audit entries older than the given number of days.
pub fn prune_audit_log(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(retention_days);
    let deleted = conn.execute(
        "DELETE FROM audit_log WHERE timestamp < ?1",
        params![crate::db::format_timestamp(&cutoff)],
    )?;
    Ok(deleted)
}

/// Audit entries recorded for one profile, newest first.
pub fn query_audit_by_profile(
    conn: &Connection,
    profile_id: &str,
) -> Result<Vec<AuditRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, source, action, entity, profile_id FROM audit_log
         WHERE profile_id = ?1 ORDER BY timestamp DESC, id DESC",
    )?;
    let rows = stmt
        .query_map(params![profile_id], |row| {
            Ok(AuditRecord {
                timestamp: row.get(0)?,
                source: row.get(1)?,
                action: row.get(2)?,
                entity: row.get(3)?,
                profile_id: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
