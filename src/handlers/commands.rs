//! Handlers for updates that no scene claimed

use std::sync::Arc;

use tracing::debug;

use super::registration::REGISTRATION_SCENE;
use crate::state::Scenario;
use crate::transport::InboundUpdate;
use crate::utils::errors::Result;

pub const HELP_TEXT: &str = "Send /start to register.\nSend /cancel at any time to stop.";

/// Handle an update arriving while no scene is active
pub async fn handle_without_scene(scenario: Scenario, update: Arc<dyn InboundUpdate>) -> Result<()> {
    let command = update.text().map(str::trim).unwrap_or_default();

    if command.eq_ignore_ascii_case("/start") {
        debug!(user_id = update.sender_id(), "Starting registration");
        return scenario.enter_scene(update, REGISTRATION_SCENE).await;
    }

    update.reply(HELP_TEXT).await
}
