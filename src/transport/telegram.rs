//! Telegram transport built on teloxide

use async_trait::async_trait;
use teloxide::{prelude::*, types::{CallbackQuery, ChatId, Message}};
use tracing::debug;

use super::InboundUpdate;
use crate::utils::errors::Result;

/// A teloxide message or callback query adapted to [`InboundUpdate`]
#[derive(Clone)]
pub struct TelegramUpdate {
    bot: Bot,
    sender_id: i64,
    chat_id: Option<ChatId>,
    text: Option<String>,
}

impl TelegramUpdate {
    /// Adapt a regular message.
    ///
    /// Returns `None` for messages without a sender, such as channel posts,
    /// which have no user slot to keep a session in.
    pub fn from_message(bot: Bot, msg: &Message) -> Option<Self> {
        let sender = msg.from.as_ref()?;
        Some(Self {
            bot,
            sender_id: sender.id.0 as i64,
            chat_id: Some(msg.chat.id),
            text: msg.text().map(ToOwned::to_owned),
        })
    }

    /// Adapt a callback query; the callback data is exposed as text
    pub fn from_callback(bot: Bot, query: &CallbackQuery) -> Self {
        Self {
            bot,
            sender_id: query.from.id.0 as i64,
            chat_id: query.message.as_ref().map(|m| m.chat().id),
            text: query.data.clone(),
        }
    }

    fn reply_target(&self) -> ChatId {
        self.chat_id.unwrap_or(ChatId(self.sender_id))
    }
}

#[async_trait]
impl InboundUpdate for TelegramUpdate {
    fn sender_id(&self) -> i64 {
        self.sender_id
    }

    fn chat_id(&self) -> Option<i64> {
        self.chat_id.map(|id| id.0)
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    async fn reply(&self, text: &str) -> Result<()> {
        let target = self.reply_target();
        debug!(chat_id = target.0, user_id = self.sender_id, "Sending reply");
        self.bot.send_message(target, text.to_string()).await?;
        Ok(())
    }
}

impl std::fmt::Debug for TelegramUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramUpdate")
            .field("sender_id", &self.sender_id)
            .field("chat_id", &self.chat_id)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
