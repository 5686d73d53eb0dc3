//! Session storage
//!
//! A store persists erased sessions keyed by `(chat_id, user_id)`. Three
//! backends are provided: an in-process map, Redis and PostgreSQL.

pub mod memory;
pub mod postgres;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Settings, StorageBackend};
use crate::state::ErasedSession;
use crate::utils::errors::Result;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use self::redis::RedisStore;

/// Persistence contract for erased sessions
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the session of one slot.
    ///
    /// A missing slot is reported as
    /// [`ScenarioError::SessionNotFound`](crate::utils::errors::ScenarioError::SessionNotFound).
    async fn get(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession>;

    /// Insert or overwrite the session of its slot
    async fn set(&self, session: &ErasedSession) -> Result<()>;
}

/// Open the store selected by configuration
pub async fn connect(settings: &Settings) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match settings.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Redis => {
            let store = RedisStore::new(settings.redis.clone()).await?;
            store.ping().await?;
            Arc::new(store)
        }
        StorageBackend::Postgres => Arc::new(PostgresStore::connect(&settings.database).await?),
    };

    info!(backend = ?settings.storage.backend, "Session store ready");
    Ok(store)
}
