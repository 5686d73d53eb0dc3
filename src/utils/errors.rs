//! Error handling for telescene
//!
//! This module defines the error type shared by the session model, the
//! scenario dispatcher, the storage backends and the Telegram transport.

use thiserror::Error;

/// Main error type for telescene operations
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Session not found: chat {chat_id}, user {user_id}")]
    SessionNotFound { chat_id: i64, user_id: i64 },

    #[error("Scene not found: {0:?}")]
    SceneNotFound(String),

    #[error("Failed to decode session data: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode session data: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Context type mismatch: scene expects {expected}, context holds {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("{operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<ScenarioError>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Scene handler error: {0}")]
    Handler(#[from] anyhow::Error),
}

/// Result type alias for telescene operations
pub type Result<T> = std::result::Result<T, ScenarioError>;

impl ScenarioError {
    /// Wrap the error with the name of the operation that produced it
    pub fn context(self, operation: &'static str) -> Self {
        ScenarioError::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any operation wrappers
    pub fn root(&self) -> &ScenarioError {
        let mut current = self;
        while let ScenarioError::Operation { source, .. } = current {
            current = source;
        }
        current
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ScenarioError::SessionNotFound { .. } => true,
            ScenarioError::SceneNotFound(_) => false,
            ScenarioError::Decode(_) => false,
            ScenarioError::Encode(_) => false,
            ScenarioError::TypeMismatch { .. } => false,
            ScenarioError::Timeout { .. } => true,
            ScenarioError::Operation { source, .. } => source.is_recoverable(),
            ScenarioError::Database(_) => true,
            ScenarioError::Redis(_) => true,
            ScenarioError::Telegram(_) => true,
            ScenarioError::Config(_) => false,
            ScenarioError::ConfigLoad(_) => false,
            ScenarioError::Handler(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScenarioError::SessionNotFound { .. } => ErrorSeverity::Info,
            ScenarioError::SceneNotFound(_) => ErrorSeverity::Warning,
            ScenarioError::TypeMismatch { .. } => ErrorSeverity::Critical,
            ScenarioError::Encode(_) => ErrorSeverity::Critical,
            ScenarioError::Config(_) | ScenarioError::ConfigLoad(_) => ErrorSeverity::Critical,
            ScenarioError::Timeout { .. } => ErrorSeverity::Warning,
            ScenarioError::Operation { source, .. } => source.severity(),
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
