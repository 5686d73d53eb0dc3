//! Redis session store
//!
//! Sessions are stored as JSON strings under
//! `{prefix}session:{chat_id}:{user_id}` and expire after the configured TTL.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, error};

use super::Store;
use crate::config::RedisConfig;
use crate::state::ErasedSession;
use crate::utils::errors::{ScenarioError, Result};

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisStore {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    config: RedisConfig,
}

impl RedisStore {
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Check the connection with a `PING`
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn session_key(&self, chat_id: i64, user_id: i64) -> String {
        session_key(&self.config.prefix, chat_id, user_id)
    }
}

fn session_key(prefix: &str, chat_id: i64, user_id: i64) -> String {
    format!("{}session:{}:{}", prefix, chat_id, user_id)
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession> {
        let key = self.session_key(chat_id, user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = match conn.get::<_, Option<String>>(&key).await {
            Ok(data) => data,
            Err(e) => {
                error!(chat_id, user_id, error = %e, "Failed to get session from Redis");
                return Err(e.into());
            }
        };

        let Some(data) = serialized else {
            debug!(chat_id, user_id, key = %key, "No session found in Redis");
            return Err(ScenarioError::SessionNotFound { chat_id, user_id });
        };

        let session = serde_json::from_str::<ErasedSession>(&data).map_err(ScenarioError::Decode)?;
        debug!(chat_id, user_id, scene = %session.scene, step = session.step, "Session loaded from Redis");
        Ok(session)
    }

    async fn set(&self, session: &ErasedSession) -> Result<()> {
        let key = self.session_key(session.chat_id, session.user_id);
        let serialized = serde_json::to_string(session).map_err(ScenarioError::Encode)?;
        let mut conn = self.connection_manager.clone();

        let result = if self.config.ttl_seconds > 0 {
            conn.set_ex::<_, _, ()>(&key, serialized, self.config.ttl_seconds).await
        } else {
            conn.set::<_, _, ()>(&key, serialized).await
        };

        if let Err(e) = result {
            error!(chat_id = session.chat_id, user_id = session.user_id, error = %e, "Failed to save session to Redis");
            return Err(e.into());
        }

        debug!(
            chat_id = session.chat_id,
            user_id = session.user_id,
            ttl_seconds = self.config.ttl_seconds,
            "Session saved to Redis"
        );
        Ok(())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_layout() {
        assert_eq!(session_key("telescene:", -100123, 42), "telescene:session:-100123:42");
        assert_eq!(session_key("", 0, 7), "session:0:7");
    }

    #[test]
    fn test_stored_form_is_plain_json() {
        let mut session = ErasedSession::empty(1, 2);
        session.scene = "registration".to_string();
        session.step = 1;

        let encoded = serde_json::to_value(&session).unwrap();
        assert_eq!(encoded["scene"], "registration");
        assert_eq!(encoded["step"], 1);

        let decoded: ErasedSession = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, session);
    }
}
