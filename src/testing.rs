//! Test doubles shared by the unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::state::{downcast, ErasedSession, Scene, SceneContext};
use crate::storage::{MemoryStore, Store};
use crate::transport::InboundUpdate;
use crate::utils::errors::{ScenarioError, Result};

/// Update that records every reply sent through it
#[derive(Debug)]
pub struct RecordingUpdate {
    chat_id: Option<i64>,
    sender_id: i64,
    text: String,
    replies: Mutex<Vec<String>>,
}

impl RecordingUpdate {
    pub fn new(chat_id: i64, sender_id: i64, text: &str) -> Self {
        Self {
            chat_id: Some(chat_id),
            sender_id,
            text: text.to_string(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl InboundUpdate for RecordingUpdate {
    fn sender_id(&self) -> i64 {
        self.sender_id
    }

    fn chat_id(&self) -> Option<i64> {
        self.chat_id
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }

    async fn reply(&self, text: &str) -> Result<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Memory store that counts writes and can be told to fail
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    history: Mutex<Vec<ErasedSession>>,
    writes: AtomicUsize,
    fail_get: AtomicBool,
    not_found: AtomicBool,
    fail_set: AtomicBool,
    stall: Mutex<Option<Duration>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing store, bypassing the counters
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn history(&self) -> Vec<ErasedSession> {
        self.history.lock().unwrap().clone()
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_get_with_not_found(&self, fail: bool) {
        self.not_found.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Delay every call by `delay`
    pub fn stall(&self, delay: Duration) {
        *self.stall.lock().unwrap() = Some(delay);
    }

    async fn maybe_stall(&self) {
        let delay = *self.stall.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn get(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession> {
        self.maybe_stall().await;
        if self.not_found.load(Ordering::SeqCst) {
            return Err(ScenarioError::SessionNotFound { chat_id, user_id });
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(ScenarioError::Config("get failed".to_string()));
        }
        self.inner.get(chat_id, user_id).await
    }

    async fn set(&self, session: &ErasedSession) -> Result<()> {
        self.maybe_stall().await;
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(ScenarioError::Config("set failed".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.history.lock().unwrap().push(session.clone());
        self.inner.set(session).await
    }
}

#[derive(Default)]
struct Calls {
    enters: AtomicUsize,
    updates: AtomicUsize,
    leaves: AtomicUsize,
}

/// Untyped scene counting its hook calls
#[derive(Clone)]
pub struct ProbeScene {
    name: String,
    dirtying: bool,
    failing: bool,
    calls: Arc<Calls>,
}

impl ProbeScene {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dirtying: false,
            failing: false,
            calls: Arc::default(),
        }
    }

    /// Bump the step on every update
    pub fn dirtying(mut self) -> Self {
        self.dirtying = true;
        self
    }

    /// Fail every update with a handler error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn enters(&self) -> usize {
        self.calls.enters.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.calls.updates.load(Ordering::SeqCst)
    }

    pub fn leaves(&self) -> usize {
        self.calls.leaves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scene for ProbeScene {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enter(&self, _ctx: &mut dyn SceneContext) -> Result<()> {
        self.calls.enters.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_update(&self, ctx: &mut dyn SceneContext) -> Result<()> {
        self.calls.updates.fetch_add(1, Ordering::SeqCst);
        if self.dirtying {
            let ctx = downcast::<Value>(ctx)?;
            let step = ctx.session().step;
            ctx.set_step(step + 1);
        }
        if self.failing {
            return Err(anyhow::anyhow!("probe failed").into());
        }
        Ok(())
    }

    async fn leave(&self, _ctx: &mut dyn SceneContext) -> Result<()> {
        self.calls.leaves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
