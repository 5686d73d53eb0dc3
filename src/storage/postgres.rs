//! PostgreSQL session store
//!
//! Expects the table below to exist; the store does not create it.
//!
//! ```sql
//! CREATE TABLE scene_sessions (
//!     chat_id    BIGINT      NOT NULL,
//!     user_id    BIGINT      NOT NULL,
//!     scene      TEXT        NOT NULL DEFAULT '',
//!     step       INT         NOT NULL DEFAULT 0,
//!     data       JSONB       NOT NULL DEFAULT '{}',
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     PRIMARY KEY (chat_id, user_id)
//! );
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use super::Store;
use crate::config::DatabaseConfig;
use crate::state::ErasedSession;
use crate::utils::errors::{ScenarioError, Result};

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Some(Duration::from_secs(600)))
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct SessionRow {
    chat_id: i64,
    user_id: i64,
    scene: String,
    step: i32,
    data: serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl From<SessionRow> for ErasedSession {
    fn from(row: SessionRow) -> Self {
        Self {
            chat_id: row.chat_id,
            user_id: row.user_id,
            scene: row.scene,
            step: row.step,
            data: row.data,
            updated: row.updated_at,
        }
    }
}

/// Session store over a `scene_sessions` table
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pool from configuration and wrap it
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(create_pool(config).await?))
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn get(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT chat_id, user_id, scene, step, data, updated_at FROM scene_sessions WHERE chat_id = $1 AND user_id = $2",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                debug!(chat_id, user_id, "No session row found");
                Err(ScenarioError::SessionNotFound { chat_id, user_id })
            }
        }
    }

    async fn set(&self, session: &ErasedSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scene_sessions (chat_id, user_id, scene, step, data, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (chat_id, user_id) DO UPDATE
            SET scene = EXCLUDED.scene,
                step = EXCLUDED.step,
                data = EXCLUDED.data,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(session.chat_id)
        .bind(session.user_id)
        .bind(&session.scene)
        .bind(session.step)
        .bind(&session.data)
        .bind(session.updated)
        .execute(&self.pool)
        .await?;

        debug!(chat_id = session.chat_id, user_id = session.user_id, "Session row upserted");
        Ok(())
    }
}
