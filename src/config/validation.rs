//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ScenarioError, Result};
use super::{Settings, StorageBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_storage_config(&settings.storage)?;

    match settings.storage.backend {
        StorageBackend::Memory => {}
        StorageBackend::Redis => validate_redis_config(&settings.redis)?,
        StorageBackend::Postgres => validate_database_config(&settings.database)?,
    }

    validate_wizard_config(&settings.wizard)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate everything the bot binary needs, including the token
pub fn validate_bot_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_settings(settings)
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(ScenarioError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.operation_timeout_ms == 0 {
        return Err(ScenarioError::Config(
            "Store operation timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ScenarioError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ScenarioError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(ScenarioError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ScenarioError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate wizard configuration
fn validate_wizard_config(config: &super::WizardConfig) -> Result<()> {
    if config.cancel_command.trim().is_empty() {
        return Err(ScenarioError::Config(
            "Wizard cancel command is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ScenarioError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ScenarioError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings_are_valid_for_library_use() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_bot_requires_token() {
        let settings = Settings::default();
        assert_matches!(validate_bot_settings(&settings), Err(ScenarioError::Config(msg)) if msg.contains("token"));

        let mut settings = Settings::default();
        settings.bot.token = "12345:test_token".to_string();
        assert!(validate_bot_settings(&settings).is_ok());
    }

    #[test]
    fn test_backend_specific_checks() {
        let mut settings = Settings::default();
        settings.redis.url.clear();
        // Redis URL is irrelevant for the memory backend
        assert!(validate_settings(&settings).is_ok());

        settings.storage.backend = StorageBackend::Redis;
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.storage.backend = StorageBackend::Postgres;
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.storage.operation_timeout_ms = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level_and_cancel_command() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());

        let mut settings = Settings::default();
        settings.wizard.cancel_command = "  ".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
