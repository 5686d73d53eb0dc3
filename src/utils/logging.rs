//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging helpers
//! for scene transitions and session writes.

use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{ScenarioError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, &config.file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| ScenarioError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a scene transition for one (chat, user) slot
pub fn log_scene_transition(chat_id: i64, user_id: i64, from: &str, to: &str) {
    info!(
        chat_id = chat_id,
        user_id = user_id,
        from = if from.is_empty() { "<none>" } else { from },
        to = if to.is_empty() { "<none>" } else { to },
        "Scene transition"
    );
}

/// Log a persisted session write
pub fn log_session_write(chat_id: i64, user_id: i64, operation: &str, scene: &str, step: i32, duration_ms: u64) {
    debug!(
        chat_id = chat_id,
        user_id = user_id,
        operation = operation,
        scene = scene,
        step = step,
        duration_ms = duration_ms,
        "Session persisted"
    );
}
