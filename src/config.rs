use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Klinik Sentosa";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_SESSION_HOURS: i64 = 12;
pub const DB_FILE_NAME: &str = "klinik.db";

/// Get the application data directory
/// ~/KlinikSentosa/ on all platforms
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("KlinikSentosa"))
}

/// Default database location inside the data directory
pub fn default_db_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(DB_FILE_NAME))
}

/// Default `tracing` filter when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "klinik_sentosa=info,tower_http=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid bind address {0:?}")]
    InvalidBind(String),
    #[error("Invalid session lifetime {0:?}: expected a positive number of hours")]
    InvalidSessionHours(String),
    #[error("Cannot determine home directory; set KLINIK_DB_PATH")]
    NoDataDir,
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub session_ttl: chrono::Duration,
}

impl ServerConfig {
    /// Resolve from `KLINIK_BIND`, `KLINIK_DB_PATH` and `KLINIK_SESSION_HOURS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("KLINIK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        let db_path = match lookup("KLINIK_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path().ok_or(ConfigError::NoDataDir)?,
        };

        let session_hours = match lookup("KLINIK_SESSION_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => return Err(ConfigError::InvalidSessionHours(raw)),
            },
            None => DEFAULT_SESSION_HOURS,
        };

        Ok(Self {
            bind,
            db_path,
            session_ttl: chrono::Duration::hours(session_hours),
        })
    }
}
