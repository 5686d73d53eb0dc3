//! Step-by-step wizard scene
//!
//! A wizard is an ordered list of async steps sharing one typed payload. The
//! session step is the cursor: each update runs the step under the cursor and
//! the step decides whether the cursor moves on. Finishing the last step, or
//! sending the cancel command, leaves the scene.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::context::{downcast, Context, SceneContext};
use super::scenario::Scenario;
use super::scene::Scene;
use super::session::{ErasedSession, SessionData};
use crate::config::WizardConfig;
use crate::transport::InboundUpdate;
use crate::utils::errors::Result;

/// Future returned by a wizard step; resolves to whether the wizard advances
pub type StepResult<'a> = Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

type Step<T> = Box<dyn for<'a> Fn(&'a mut Context<T>) -> StepResult<'a> + Send + Sync>;

/// Cursor value of a wizard that is not running
pub const INACTIVE_STEP: i32 = -1;

pub struct Wizard<T> {
    name: String,
    steps: Vec<Step<T>>,
    cancel_command: String,
    cancel_reply: String,
}

impl<T: SessionData> Wizard<T> {
    pub fn new(name: impl Into<String>) -> Self {
        let defaults = WizardConfig::default();
        Self {
            name: name.into(),
            steps: Vec::new(),
            cancel_command: defaults.cancel_command,
            cancel_reply: defaults.cancel_reply,
        }
    }

    /// Append a step
    pub fn step<F>(mut self, step: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> StepResult<'a> + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Override the cancel command and the reply sent when it is used
    pub fn with_cancel(mut self, command: impl Into<String>, reply: impl Into<String>) -> Self {
        self.cancel_command = command.into();
        self.cancel_reply = reply.into();
        self
    }

    pub fn with_cancel_config(self, config: &WizardConfig) -> Self {
        self.with_cancel(config.cancel_command.clone(), config.cancel_reply.clone())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn is_cancel(&self, text: Option<&str>) -> bool {
        text.map(str::trim)
            .is_some_and(|text| text.eq_ignore_ascii_case(&self.cancel_command))
    }
}

#[async_trait]
impl<T: SessionData> Scene for Wizard<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enter(&self, ctx: &mut dyn SceneContext) -> Result<()> {
        let ctx = downcast::<T>(ctx)?;
        ctx.set_step(0);
        Ok(())
    }

    async fn on_update(&self, ctx: &mut dyn SceneContext) -> Result<()> {
        let ctx = downcast::<T>(ctx)?;
        let cursor = ctx.session().step;

        let Some(step) = usize::try_from(cursor).ok().and_then(|idx| self.steps.get(idx)) else {
            debug!(wizard = %self.name, step = cursor, "Wizard cursor out of range, leaving");
            return ctx.leave().await;
        };

        if self.is_cancel(ctx.text()) {
            debug!(wizard = %self.name, chat_id = ctx.chat_id(), user_id = ctx.user_id(), "Wizard cancelled");
            if let Err(e) = ctx.reply(&self.cancel_reply).await {
                warn!(wizard = %self.name, error = %e, "Failed to acknowledge cancellation");
            }
            return ctx.leave().await;
        }

        if !step(&mut *ctx).await? {
            return Ok(());
        }

        let next = cursor + 1;
        if next as usize >= self.steps.len() {
            debug!(wizard = %self.name, chat_id = ctx.chat_id(), user_id = ctx.user_id(), "Wizard completed");
            ctx.leave().await
        } else {
            ctx.set_step(next);
            Ok(())
        }
    }

    async fn leave(&self, ctx: &mut dyn SceneContext) -> Result<()> {
        let ctx = downcast::<T>(ctx)?;
        ctx.set_step(INACTIVE_STEP);
        Ok(())
    }

    fn build_context(
        &self,
        scenario: Scenario,
        update: Arc<dyn InboundUpdate>,
        session: ErasedSession,
    ) -> Result<Box<dyn SceneContext>> {
        Ok(Box::new(Context::<T>::from_erased(scenario, update, session)?))
    }
}
