pub mod api;
pub mod auth;
pub mod config;
pub mod core_state;
pub mod dashboards;
pub mod db;
pub mod gate;
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Startup and shutdown failures of the service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
    #[error("Cannot listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Run the clinic service until Ctrl-C.
pub async fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ServerConfig::from_env()?;
    let core = Arc::new(core_state::CoreState::from_config(&config)?);
    let server = api::start_server_on(core.clone(), config.bind).await?;
    tracing::info!(addr = %server.addr(), "Listening");

    let signal = tokio::signal::ctrl_c().await;
    server.stop().await;

    if let Err(e) = core.flush_and_prune_audit() {
        tracing::warn!("Final audit flush failed: {e}");
    }
    signal.map_err(AppError::Signal)
}
