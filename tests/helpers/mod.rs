//! Test helpers
//!
//! Scripted updates and an instrumented store for driving the scenario
//! dispatcher end to end without Telegram or a database.

#![allow(dead_code)]

pub mod simple_test;

pub use simple_test::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use telescene::storage::{MemoryStore, Store};
use telescene::{ErasedSession, InboundUpdate, Result};

/// Update from a fixed sender that records the replies it receives
#[derive(Debug)]
pub struct ScriptedUpdate {
    pub chat_id: Option<i64>,
    pub sender_id: i64,
    pub text: Option<String>,
    replies: Mutex<Vec<String>>,
}

impl ScriptedUpdate {
    pub fn new(chat_id: i64, sender_id: i64, text: &str) -> Arc<Self> {
        Arc::new(Self {
            chat_id: Some(chat_id),
            sender_id,
            text: Some(text.to_string()),
            replies: Mutex::new(Vec::new()),
        })
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl InboundUpdate for ScriptedUpdate {
    fn sender_id(&self) -> i64 {
        self.sender_id
    }

    fn chat_id(&self) -> Option<i64> {
        self.chat_id
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    async fn reply(&self, text: &str) -> Result<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Memory store counting the writes that reach it
#[derive(Default)]
pub struct TrackingStore {
    pub inner: MemoryStore,
    writes: AtomicUsize,
}

impl TrackingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn session(&self, chat_id: i64, user_id: i64) -> ErasedSession {
        self.inner.get(chat_id, user_id).await.unwrap()
    }
}

#[async_trait]
impl Store for TrackingStore {
    async fn get(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession> {
        self.inner.get(chat_id, user_id).await
    }

    async fn set(&self, session: &ErasedSession) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(session).await
    }
}
