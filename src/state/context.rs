//! Per-update scene context
//!
//! A [`Context<T>`] carries the typed session of one `(chat, user)` slot for
//! the duration of a single update. It never talks to storage itself: the
//! scenario decides when to persist, and the only trigger for a write is the
//! dirty flag raised by the mutating accessors below.

use std::any::{type_name, Any};
use std::sync::Arc;

use async_trait::async_trait;

use super::scenario::Scenario;
use super::session::{ErasedSession, Session, SessionData};
use crate::transport::{identity, InboundUpdate};
use crate::utils::errors::{ScenarioError, Result};

/// Typed scene context
pub struct Context<T> {
    scenario: Scenario,
    update: Arc<dyn InboundUpdate>,
    session: Session<T>,
    dirty: bool,
    cached: Option<ErasedSession>,
    chat_id: i64,
    user_id: i64,
}

impl<T: SessionData> Context<T> {
    /// Build a context around an already decoded session.
    ///
    /// Identity comes from the update and the payload starts from `T::default()`.
    pub fn new(scenario: Scenario, update: Arc<dyn InboundUpdate>, mut session: Session<T>) -> Self {
        let (chat_id, user_id) = identity(update.as_ref());
        session.chat_id = chat_id;
        session.user_id = user_id;
        session.data = T::default();

        Self {
            scenario,
            update,
            session,
            dirty: false,
            cached: None,
            chat_id,
            user_id,
        }
    }

    /// Build a context from a stored session, keeping its payload
    pub fn from_erased(scenario: Scenario, update: Arc<dyn InboundUpdate>, mut erased: ErasedSession) -> Result<Self> {
        let (chat_id, user_id) = identity(update.as_ref());
        erased.chat_id = chat_id;
        erased.user_id = user_id;
        let session = Session::from_erased(Some(&erased))?;

        Ok(Self {
            scenario,
            update,
            session,
            dirty: false,
            cached: Some(erased),
            chat_id,
            user_id,
        })
    }

    pub fn data(&self) -> &T {
        &self.session.data
    }

    pub fn get_data(&self) -> T
    where
        T: Clone,
    {
        self.session.data.clone()
    }

    pub fn set_data(&mut self, data: T) {
        self.session.data = data;
        self.mark_dirty();
    }

    /// Mutable access to the payload; marks the context dirty
    pub fn data_mut(&mut self) -> &mut T {
        self.mark_dirty();
        &mut self.session.data
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn set_step(&mut self, step: i32) {
        self.session.step = step;
        self.mark_dirty();
    }

    pub fn set_scene(&mut self, scene: impl Into<String>) {
        self.session.scene = scene.into();
        self.mark_dirty();
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn update(&self) -> &Arc<dyn InboundUpdate> {
        &self.update
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Text of the update being handled
    pub fn text(&self) -> Option<&str> {
        self.update.text()
    }

    /// Reply into the chat the update came from
    pub async fn reply(&self, text: &str) -> Result<()> {
        self.update.reply(text).await
    }

    /// Storage form of the session, cached until the next mutation
    pub fn erased_session(&mut self) -> Result<ErasedSession> {
        if !self.dirty {
            if let Some(cached) = &self.cached {
                return Ok(cached.clone());
            }
        }

        let erased = self.session.to_erased()?;
        self.cached = Some(erased.clone());
        Ok(erased)
    }

    /// Rebase the context on a stored session and clear the dirty flag
    pub fn set_erased_session(&mut self, erased: ErasedSession) -> Result<()> {
        self.session = Session::from_erased(Some(&erased))?;
        self.cached = Some(erased);
        self.dirty = false;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.cached = None;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Switch this slot into `scene`. Unknown scenes are ignored.
    pub async fn enter(&mut self, scene: &str) -> Result<()> {
        let scenario = self.scenario.clone();
        scenario.enter(self, scene).await
    }

    /// Enter the current scene again from its first hook
    pub async fn reenter(&mut self) -> Result<()> {
        let scene = self.session.scene.clone();
        self.enter(&scene).await
    }

    /// Leave the current scene
    pub async fn leave(&mut self) -> Result<()> {
        let scenario = self.scenario.clone();
        scenario.leave(self).await
    }
}

/// Type-erased view of a [`Context<T>`] used by the dispatcher and by scenes
#[async_trait]
pub trait SceneContext: Any + Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Name of the payload type carried by the context
    fn data_type_name(&self) -> &'static str;

    fn update(&self) -> &Arc<dyn InboundUpdate>;

    fn chat_id(&self) -> i64;

    fn user_id(&self) -> i64;

    /// Active scene name; empty when none
    fn scene(&self) -> &str;

    fn step(&self) -> i32;

    fn erased_session(&mut self) -> Result<ErasedSession>;

    fn set_erased_session(&mut self, erased: ErasedSession) -> Result<()>;

    fn is_dirty(&self) -> bool;

    fn mark_dirty(&mut self);

    fn clear_dirty(&mut self);

    async fn enter(&mut self, scene: &str) -> Result<()>;

    async fn reenter(&mut self) -> Result<()>;

    async fn leave(&mut self) -> Result<()>;
}

#[async_trait]
impl<T: SessionData> SceneContext for Context<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn data_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn update(&self) -> &Arc<dyn InboundUpdate> {
        &self.update
    }

    fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn user_id(&self) -> i64 {
        self.user_id
    }

    fn scene(&self) -> &str {
        &self.session.scene
    }

    fn step(&self) -> i32 {
        self.session.step
    }

    fn erased_session(&mut self) -> Result<ErasedSession> {
        Context::erased_session(self)
    }

    fn set_erased_session(&mut self, erased: ErasedSession) -> Result<()> {
        Context::set_erased_session(self, erased)
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_dirty(&mut self) {
        Context::mark_dirty(self)
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    async fn enter(&mut self, scene: &str) -> Result<()> {
        Context::enter(self, scene).await
    }

    async fn reenter(&mut self) -> Result<()> {
        Context::reenter(self).await
    }

    async fn leave(&mut self) -> Result<()> {
        Context::leave(self).await
    }
}

/// Recover the typed context behind an erased one
pub fn downcast<T: SessionData>(ctx: &mut dyn SceneContext) -> Result<&mut Context<T>> {
    let actual = ctx.data_type_name();
    ctx.as_any_mut()
        .downcast_mut::<Context<T>>()
        .ok_or(ScenarioError::TypeMismatch {
            expected: type_name::<T>(),
            actual,
        })
}
