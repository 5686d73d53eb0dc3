//! Transport abstraction
//!
//! The dispatcher only needs to know who sent an update, which chat it came
//! from, what text it carried and how to answer it. Any chat transport that
//! can provide those capabilities drives the engine.

pub mod telegram;

use async_trait::async_trait;
use crate::utils::errors::Result;

pub use telegram::TelegramUpdate;

/// One inbound update as seen by the scene engine
#[async_trait]
pub trait InboundUpdate: Send + Sync {
    /// Identity of the sender
    fn sender_id(&self) -> i64;

    /// Identity of the chat, if the update belongs to one
    fn chat_id(&self) -> Option<i64>;

    /// Free-form text carried by the update
    fn text(&self) -> Option<&str>;

    /// Send a text reply into the originating chat
    async fn reply(&self, text: &str) -> Result<()>;
}

/// Derive the `(chat_id, user_id)` session key of an update.
///
/// Updates without a chat map onto chat 0.
pub fn identity(update: &dyn InboundUpdate) -> (i64, i64) {
    (update.chat_id().unwrap_or_default(), update.sender_id())
}
