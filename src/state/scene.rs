//! Scene trait

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::context::{Context, SceneContext};
use super::scenario::Scenario;
use super::session::ErasedSession;
use crate::transport::InboundUpdate;
use crate::utils::errors::Result;

/// A named conversation state with lifecycle hooks.
///
/// Hooks receive the erased context; scenes that work with typed data recover
/// it with [`downcast`](super::context::downcast). A scene also owns the
/// factory for its context, so the dispatcher never has to guess the payload
/// type.
#[async_trait]
pub trait Scene: Send + Sync {
    /// Registry key
    fn name(&self) -> &str;

    /// Called once when a slot switches into this scene
    async fn enter(&self, ctx: &mut dyn SceneContext) -> Result<()>;

    /// Called for every update while the scene is active
    async fn on_update(&self, ctx: &mut dyn SceneContext) -> Result<()>;

    /// Called once when the slot leaves this scene
    async fn leave(&self, ctx: &mut dyn SceneContext) -> Result<()>;

    /// Build the context this scene expects from a stored session.
    ///
    /// The default carries the payload as untyped JSON.
    fn build_context(
        &self,
        scenario: Scenario,
        update: Arc<dyn InboundUpdate>,
        session: ErasedSession,
    ) -> Result<Box<dyn SceneContext>> {
        Ok(Box::new(Context::<Value>::from_erased(scenario, update, session)?))
    }
}
