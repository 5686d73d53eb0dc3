//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub redis: RedisConfig,
    pub database: DatabaseConfig,
    pub wizard: WizardConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
}

/// Which session store backs the scenario dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Redis,
    Postgres,
}

/// Session storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Upper bound for every single store call
    pub operation_timeout_ms: u64,
}

impl StorageConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    /// Session expiry; 0 keeps sessions forever
    pub ttl_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Wizard behaviour shared by all wizard scenes
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WizardConfig {
    pub cancel_command: String,
    pub cancel_reply: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rolling log file; stdout only when unset
    pub directory: Option<String>,
    pub file_name: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("TELESCENE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load settings from an explicit configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ScenarioError> {
        super::validation::validate_settings(self)
    }

    /// Validate settings required to run the bot binary
    pub fn validate_for_bot(&self) -> Result<(), crate::utils::errors::ScenarioError> {
        super::validation::validate_bot_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            storage: StorageConfig::default(),
            redis: RedisConfig::default(),
            database: DatabaseConfig::default(),
            wizard: WizardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            operation_timeout_ms: 5000,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "telescene:".to_string(),
            ttl_seconds: 86400,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/telescene".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            cancel_command: "/cancel".to_string(),
            cancel_reply: "Cancelled".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_name: "telescene.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.operation_timeout(), Duration::from_secs(5));
        assert_eq!(settings.wizard.cancel_command, "/cancel");
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[bot]
token = "12345:test_token"

[storage]
backend = "redis"
operation_timeout_ms = 1500

[redis]
url = "redis://cache:6379"

[wizard]
cancel_reply = "Отменено"
"#
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.bot.token, "12345:test_token");
        assert_eq!(settings.storage.backend, StorageBackend::Redis);
        assert_eq!(settings.storage.operation_timeout(), Duration::from_millis(1500));
        assert_eq!(settings.redis.url, "redis://cache:6379");
        // Untouched fields keep their defaults
        assert_eq!(settings.redis.prefix, "telescene:");
        assert_eq!(settings.wizard.cancel_command, "/cancel");
        assert_eq!(settings.wizard.cancel_reply, "Отменено");
    }

    #[test]
    fn test_from_file_rejects_unknown_backend() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[storage]\nbackend = \"mongo\"").unwrap();

        assert!(Settings::from_file(file.path()).is_err());
    }
}
