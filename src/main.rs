//! Telescene demo bot
//!
//! Runs the registration wizard over long polling.

use std::sync::Arc;

use teloxide::{prelude::*, types::{CallbackQuery, Message, Update}};
use teloxide::dispatching::UpdateHandler;
use tracing::{debug, error, info, warn};

use telescene::{
    config::Settings,
    handlers::{handle_without_scene, registration_wizard},
    storage,
    utils::logging,
    InboundUpdate, Scenario, ScenarioError, TelegramUpdate,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate_for_bot()?;

    // Initialize logging; the guard flushes the log file on shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", telescene::info());

    let store = storage::connect(&settings).await?;
    let scenario = Scenario::new(store).with_timeout(settings.storage.operation_timeout());
    scenario.register(registration_wizard(&settings.wizard));

    let bot = Bot::new(&settings.bot.token);

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![scenario])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    info!("Bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

async fn handle_message(bot: Bot, msg: Message, scenario: Scenario) -> HandlerResult {
    let Some(update) = TelegramUpdate::from_message(bot, &msg) else {
        debug!(chat_id = msg.chat.id.0, "Message without sender, skipping");
        return Ok(());
    };
    dispatch(scenario, Arc::new(update)).await
}

async fn handle_callback(bot: Bot, query: CallbackQuery, scenario: Scenario) -> HandlerResult {
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }

    let update: Arc<dyn InboundUpdate> = Arc::new(TelegramUpdate::from_callback(bot, &query));
    dispatch(scenario, update).await
}

async fn dispatch(scenario: Scenario, update: Arc<dyn InboundUpdate>) -> HandlerResult {
    let user_id = update.sender_id();
    let fallback = scenario.clone();

    if let Err(e) = scenario
        .middleware(update, move |update| handle_without_scene(fallback, update))
        .await
    {
        log_failure(user_id, &e);
        return Err(e.into());
    }

    Ok(())
}

fn log_failure(user_id: i64, e: &ScenarioError) {
    error!(
        user_id = user_id,
        severity = %e.severity(),
        recoverable = e.is_recoverable(),
        error = %e,
        "Error handling update"
    );
}
