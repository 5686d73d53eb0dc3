//! Scenario dispatcher
//!
//! The scenario owns the scene registry and the session store. For every
//! inbound update it loads the session of the sender's slot, hands the update
//! to the active scene and persists the session when the scene changed it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, error, warn};

use super::context::{Context, SceneContext};
use super::scene::Scene;
use super::session::{ErasedSession, Session, SessionData};
use crate::storage::{MemoryStore, Store};
use crate::transport::{identity, InboundUpdate};
use crate::utils::errors::{ScenarioError, Result};
use crate::utils::logging::{log_scene_transition, log_session_write};

/// Default bound on a single store call
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of [`Scenario::handle_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// An active scene consumed the update
    Handled,
    /// No scene is active for the slot; the update belongs to the next handler
    Passed,
}

struct Inner {
    store: Arc<dyn Store>,
    scenes: RwLock<HashMap<String, Arc<dyn Scene>>>,
}

/// Cheap-to-clone handle over the scene registry and the session store
#[derive(Clone)]
pub struct Scenario {
    inner: Arc<Inner>,
    timeout: Duration,
}

impl Scenario {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                scenes: RwLock::new(HashMap::new()),
            }),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Scenario backed by a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    /// Register a scene under its name, replacing any previous one
    pub fn register<S: Scene + 'static>(&self, scene: S) -> &Self {
        self.register_shared(Arc::new(scene))
    }

    pub fn register_shared(&self, scene: Arc<dyn Scene>) -> &Self {
        let name = scene.name().to_string();
        let previous = self
            .inner
            .scenes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), scene);

        if previous.is_some() {
            warn!(scene = %name, "Scene re-registered, previous instance replaced");
        } else {
            debug!(scene = %name, "Scene registered");
        }
        self
    }

    /// Look up a registered scene
    pub fn scene(&self, name: &str) -> Option<Arc<dyn Scene>> {
        self.inner
            .scenes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Route one update to the active scene of its slot.
    ///
    /// The session is written at most once, and only when the scene left the
    /// context dirty. A failing hook leaves storage untouched.
    pub async fn handle_update(&self, update: Arc<dyn InboundUpdate>) -> Result<Dispatch> {
        let (chat_id, user_id) = identity(update.as_ref());
        let erased = self.load(chat_id, user_id).await?;

        if !erased.has_scene() {
            return Ok(Dispatch::Passed);
        }

        let Some(scene) = self.scene(&erased.scene) else {
            debug!(chat_id, user_id, scene = %erased.scene, "Stored scene is not registered, passing update on");
            return Ok(Dispatch::Passed);
        };

        let mut ctx = scene.build_context(self.clone(), update, erased)?;
        scene.on_update(&mut *ctx).await?;

        if ctx.is_dirty() {
            let erased = ctx.erased_session()?;
            self.persist("scenario.update", &erased).await?;
            ctx.clear_dirty();
        }

        Ok(Dispatch::Handled)
    }

    /// Dispatch to the active scene, or call `next` when there is none
    pub async fn middleware<F, Fut>(&self, update: Arc<dyn InboundUpdate>, next: F) -> Result<()>
    where
        F: FnOnce(Arc<dyn InboundUpdate>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        match self.handle_update(Arc::clone(&update)).await? {
            Dispatch::Handled => Ok(()),
            Dispatch::Passed => next(update).await,
        }
    }

    /// Build a typed context for handlers running outside any scene.
    ///
    /// Scene and step come from storage; a failed load is logged and treated
    /// as an empty session.
    pub async fn context<T: SessionData>(&self, update: Arc<dyn InboundUpdate>) -> Result<Context<T>> {
        let (chat_id, user_id) = identity(update.as_ref());
        let erased = match self.load(chat_id, user_id).await {
            Ok(erased) => erased,
            Err(e) => {
                error!(chat_id, user_id, error = %e, "Failed to load session, starting empty");
                ErasedSession::empty(chat_id, user_id)
            }
        };

        let session = Session::<T>::from_erased(Some(&erased))?;
        Ok(Context::new(self.clone(), update, session))
    }

    /// Enter `name` for the sender of `update`, using the scene's own context.
    ///
    /// The payload left by a previous scene is not carried over.
    pub async fn enter_scene(&self, update: Arc<dyn InboundUpdate>, name: &str) -> Result<()> {
        let Some(scene) = self.scene(name) else {
            debug!(scene = %name, "Enter requested for unregistered scene, ignoring");
            return Ok(());
        };

        let (chat_id, user_id) = identity(update.as_ref());
        let mut erased = match self.load(chat_id, user_id).await {
            Ok(erased) => erased,
            Err(e) => {
                error!(chat_id, user_id, error = %e, "Failed to load session, starting empty");
                ErasedSession::empty(chat_id, user_id)
            }
        };
        erased.data = ErasedSession::empty(chat_id, user_id).data;

        let mut ctx = scene.build_context(self.clone(), update, erased)?;
        self.enter(&mut *ctx, name).await
    }

    /// Switch the slot of `ctx` into `name` and run its first update.
    ///
    /// Unknown scenes are a silent no-op.
    pub async fn enter(&self, ctx: &mut dyn SceneContext, name: &str) -> Result<()> {
        let Some(scene) = self.scene(name) else {
            debug!(chat_id = ctx.chat_id(), user_id = ctx.user_id(), scene = %name, "Enter requested for unregistered scene, ignoring");
            return Ok(());
        };

        let from = ctx.scene().to_string();
        scene.enter(ctx).await.map_err(|e| e.context("scene.enter"))?;

        let mut erased = ctx.erased_session()?;
        erased.scene = name.to_string();
        ctx.mark_dirty();
        self.persist("scenario.enter", &erased).await?;
        ctx.set_erased_session(erased)?;
        log_scene_transition(ctx.chat_id(), ctx.user_id(), &from, name);

        scene.on_update(ctx).await.map_err(|e| e.context("scene.on_update"))?;

        if ctx.is_dirty() {
            let erased = ctx.erased_session()?;
            self.persist("scenario.enter", &erased).await?;
            ctx.set_erased_session(erased)?;
        }

        Ok(())
    }

    /// Leave the active scene of `ctx`.
    ///
    /// Fails with [`ScenarioError::SceneNotFound`] when no registered scene is
    /// active.
    pub async fn leave(&self, ctx: &mut dyn SceneContext) -> Result<()> {
        let current = ctx.scene().to_string();
        let scene = match self.scene(&current) {
            Some(scene) if !current.is_empty() => scene,
            _ => return Err(ScenarioError::SceneNotFound(current)),
        };

        scene.leave(ctx).await.map_err(|e| e.context("scene.leave"))?;

        let mut erased = ctx.erased_session()?;
        erased.scene.clear();
        ctx.mark_dirty();
        self.persist("scenario.leave", &erased).await?;
        ctx.set_erased_session(erased)?;
        log_scene_transition(ctx.chat_id(), ctx.user_id(), &current, "");

        Ok(())
    }

    async fn load(&self, chat_id: i64, user_id: i64) -> Result<ErasedSession> {
        match timeout(self.timeout, self.inner.store.get(chat_id, user_id)).await {
            Err(_) => Err(self.timeout_error("store.get")),
            Ok(Err(ScenarioError::SessionNotFound { .. })) => Ok(ErasedSession::empty(chat_id, user_id)),
            Ok(result) => result,
        }
    }

    async fn persist(&self, operation: &'static str, session: &ErasedSession) -> Result<()> {
        let started = Instant::now();
        timeout(self.timeout, self.inner.store.set(session))
            .await
            .map_err(|_| self.timeout_error("store.set"))
            .and_then(|result| result)
            .map_err(|e| e.context(operation))?;

        log_session_write(
            session.chat_id,
            session.user_id,
            operation,
            &session.scene,
            session.step,
            started.elapsed().as_millis() as u64,
        );
        Ok(())
    }

    fn timeout_error(&self, operation: &'static str) -> ScenarioError {
        ScenarioError::Timeout {
            operation,
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scenes: Vec<String> = self
            .inner
            .scenes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();

        f.debug_struct("Scenario")
            .field("scenes", &scenes)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
