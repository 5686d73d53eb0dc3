//! In-process session store

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::Store;
use crate::state::ErasedSession;
use crate::utils::errors::Result;

/// Map-backed store for development and tests.
///
/// Reading an unknown slot creates and keeps an empty session for it, so
/// `get` never reports a missing session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<(i64, i64), ErasedSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.entry((chat_id, user_id)).or_insert_with(|| {
            debug!(chat_id, user_id, "Creating empty session");
            ErasedSession::empty(chat_id, user_id)
        });
        Ok(session.clone())
    }

    async fn set(&self, session: &ErasedSession) -> Result<()> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((session.chat_id, session.user_id), session.clone());
        Ok(())
    }
}
