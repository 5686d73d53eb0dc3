//! Configuration loading and store selection

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use telescene::config::{Settings, StorageBackend};
use telescene::{storage, ErasedSession, ScenarioError};

#[test]
fn test_full_file_round_trip() {
    let dir = ConfigDir::new();
    let path = dir.write(
        "bot.toml",
        r#"
        [bot]
        token = "12345:abc"

        [storage]
        backend = "redis"
        operation_timeout_ms = 250

        [redis]
        url = "redis://cache:6379"
        prefix = "demo:"
        ttl_seconds = 0

        [wizard]
        cancel_command = "/stop"
        cancel_reply = "Stopped"

        [logging]
        level = "debug"
        directory = "/tmp/telescene-logs"
        "#,
    );

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.storage.backend, StorageBackend::Redis);
    assert_eq!(settings.storage.operation_timeout().as_millis(), 250);
    assert_eq!(settings.redis.prefix, "demo:");
    assert_eq!(settings.redis.ttl_seconds, 0);
    assert_eq!(settings.wizard.cancel_reply, "Stopped");
    assert_eq!(settings.logging.directory.as_deref(), Some("/tmp/telescene-logs"));
    assert_eq!(settings.database.max_connections, 10);
    settings.validate_for_bot().unwrap();
}

#[test]
fn test_missing_token_only_matters_for_the_bot() {
    let dir = ConfigDir::new();
    let path = dir.write("lib.toml", "[storage]\nbackend = \"memory\"\n");

    let settings = Settings::from_file(&path).unwrap();
    settings.validate().unwrap();
    assert_matches!(settings.validate_for_bot(), Err(ScenarioError::Config(_)));
}

#[tokio::test]
async fn test_memory_backend_connects_without_services() {
    let settings = Settings::default();
    let store = storage::connect(&settings).await.unwrap();

    let mut session = ErasedSession::empty(3, 4);
    session.scene = "registration".to_string();
    store.set(&session).await.unwrap();

    assert_eq!(store.get(3, 4).await.unwrap().scene, "registration");
}

#[tokio::test]
async fn test_unreachable_redis_fails_at_connect() {
    let mut settings = Settings::default();
    settings.storage.backend = StorageBackend::Redis;
    settings.redis.url = "redis://127.0.0.1:1/".to_string();

    assert_matches!(storage::connect(&settings).await.map(|_| ()), Err(ScenarioError::Redis(_)));
}
