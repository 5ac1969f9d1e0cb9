//! Shared application state handed to every request handler.
//!
//! Holds the database location, session lifetime and the buffered audit
//! trail. Each request opens its own SQLite connection via `open_db`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Duration;

use crate::config::ServerConfig;
use crate::db;
use crate::db::repository::{delete_expired_sessions, insert_audit_entries, prune_audit_log, AuditRecord};

/// Maximum audit buffer size before flush.
const AUDIT_BUFFER_CAPACITY: usize = 100;

/// Audit rows older than this are pruned on flush.
pub const AUDIT_RETENTION_DAYS: i64 = 90;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    db_path: PathBuf,
    session_ttl: Duration,
    audit: AuditLogger,
}

impl CoreState {
    /// Prepare the database at `db_path` (creating parent directories and
    /// running migrations) and clear out expired sessions.
    pub fn new(db_path: impl Into<PathBuf>, session_ttl: Duration) -> Result<Self, CoreError> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = db::open_database(&db_path)?;
        let expired = delete_expired_sessions(&conn, &db::now_timestamp())?;
        tracing::info!(path = %db_path.display(), expired, "Database ready");
        Ok(Self {
            db_path,
            session_ttl,
            audit: AuditLogger::new(),
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, CoreError> {
        Self::new(config.db_path.clone(), config.session_ttl)
    }

    /// Open a fresh connection for one unit of work.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    // ── Audit logging ───────────────────────────────────────

    /// Log an access event. Auto-flushes to DB when buffer is full.
    pub fn log_access(&self, source: AccessSource, action: &str, entity: &str) {
        let needs_flush = self.audit.log(source, action, entity);
        if needs_flush {
            if let Err(e) = self.flush_and_prune_audit() {
                tracing::warn!("Auto-flush audit failed: {e}");
            }
        }
    }

    /// Get the current audit buffer contents.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }

    /// Flush audit buffer to DB and prune old entries.
    pub fn flush_and_prune_audit(&self) -> Result<(), CoreError> {
        let conn = self.open_db()?;
        self.audit.flush_to_db(&conn)?;
        if let Err(e) = prune_audit_log(&conn, AUDIT_RETENTION_DAYS) {
            tracing::warn!("Failed to prune audit log: {e}");
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Cannot prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

// ═══════════════════════════════════════════════════════════
// Access source tracking
// ═══════════════════════════════════════════════════════════

/// Who made a request, for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessSource {
    Anonymous,
    Profile { profile_id: String, role: String },
}

impl std::fmt::Display for AccessSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Profile { role, .. } => write!(f, "profile:{role}"),
        }
    }
}

impl AccessSource {
    pub fn profile_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Profile { profile_id, .. } => Some(profile_id),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// In-memory audit log buffer. Entries are flushed to SQLite
/// when the buffer reaches capacity or on explicit flush.
pub struct AuditLogger {
    buffer: Mutex<Vec<AuditEntry>>,
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub source: AccessSource,
    pub action: String,
    pub entity: String,
    pub profile_id: Option<String>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(AUDIT_BUFFER_CAPACITY)),
        }
    }

    /// Returns `true` if the buffer has reached flush threshold.
    pub fn log(&self, source: AccessSource, action: &str, entity: &str) -> bool {
        if let Ok(mut buf) = self.buffer.lock() {
            let profile_id = source.profile_id().map(|s| s.to_string());
            buf.push(AuditEntry {
                timestamp: chrono::Utc::now(),
                source,
                action: action.to_string(),
                entity: entity.to_string(),
                profile_id,
            });
            buf.len() >= AUDIT_BUFFER_CAPACITY
        } else {
            false
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|mut buf| buf.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn flush_to_db(&self, conn: &rusqlite::Connection) -> Result<usize, CoreError> {
        let entries = self.drain();
        if entries.is_empty() {
            return Ok(0);
        }

        let records: Vec<AuditRecord> = entries
            .iter()
            .map(|e| AuditRecord {
                timestamp: db::format_timestamp(&e.timestamp),
                source: e.source.to_string(),
                action: e.action.clone(),
                entity: e.entity.clone(),
                profile_id: e.profile_id.clone(),
            })
            .collect();

        let count = records.len();
        insert_audit_entries(conn, &records)?;

        tracing::debug!(count, "Flushed audit entries to database");
        Ok(count)
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::query_audit_by_profile;

    fn profile_source(id: &str) -> AccessSource {
        AccessSource::Profile {
            profile_id: id.to_string(),
            role: "dokter".to_string(),
        }
    }

    fn temp_state() -> (tempfile::TempDir, CoreState) {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(dir.path().join("data").join("klinik.db"), Duration::hours(12)).unwrap();
        (dir, state)
    }

    #[test]
    fn new_creates_directories_and_schema() {
        let (_dir, state) = temp_state();
        assert!(state.db_path().exists());
        let conn = state.open_db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 12);
        assert_eq!(state.session_ttl(), Duration::hours(12));
    }

    #[test]
    fn access_source_display() {
        assert_eq!(AccessSource::Anonymous.to_string(), "anonymous");
        assert_eq!(profile_source("p-1").to_string(), "profile:dokter");
        assert_eq!(profile_source("p-1").profile_id(), Some("p-1"));
        assert_eq!(AccessSource::Anonymous.profile_id(), None);
    }

    #[test]
    fn audit_logger_records_and_drains() {
        let logger = AuditLogger::new();
        logger.log(AccessSource::Anonymous, "GET", "/api/health");
        logger.log(profile_source("p-1"), "POST", "/api/patient/queue");
        assert_eq!(logger.buffer_len(), 2);

        let entries = logger.entries();
        assert_eq!(entries[1].profile_id.as_deref(), Some("p-1"));
        assert_eq!(logger.drain().len(), 2);
        assert_eq!(logger.buffer_len(), 0);
    }

    #[test]
    fn flush_writes_buffer_to_database() {
        let (_dir, state) = temp_state();
        state.log_access(profile_source("p-1"), "GET", "/api/owner/summary");
        assert_eq!(state.audit_entries().len(), 1);

        state.flush_and_prune_audit().unwrap();
        assert!(state.audit_entries().is_empty());
        let conn = state.open_db().unwrap();
        let rows = query_audit_by_profile(&conn, "p-1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "profile:dokter");
    }

    #[test]
    fn buffer_auto_flushes_at_capacity() {
        let (_dir, state) = temp_state();
        for _ in 0..AUDIT_BUFFER_CAPACITY {
            state.log_access(profile_source("p-2"), "GET", "/dashboard");
        }
        assert!(state.audit_entries().is_empty());
        let conn = state.open_db().unwrap();
        assert_eq!(query_audit_by_profile(&conn, "p-2").unwrap().len(), AUDIT_BUFFER_CAPACITY);
    }
}
