pub mod auth;
pub mod cleaning;
pub mod commands;
pub mod config;
pub mod date_key;
pub mod db;
pub mod enrichment;
pub mod errors;
pub mod gateway;
pub mod lookup;
pub mod models;
pub mod notebook;
pub mod notes;
pub mod redaction;
pub mod remote;
pub mod secrets;
pub mod session;

use crate::config::{load_config, CONFIG_FILE_NAME};
use crate::errors::{AppError, AppResult};
use crate::notebook::NotebookCore;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<NotebookCore>,
}

pub async fn bootstrap(app_data_dir: &Path) -> AppResult<AppState> {
    std::fs::create_dir_all(app_data_dir)?;
    let config = load_config(&app_data_dir.join(CONFIG_FILE_NAME))?;
    init_tracing(app_data_dir, &config.log_level)?;

    let core = NotebookCore::from_config(app_data_dir, &config).await?;
    Ok(AppState { core })
}

pub fn init_tracing(app_data_dir: &Path, level: &str) -> AppResult<()> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "notebook.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}

pub(crate) fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
