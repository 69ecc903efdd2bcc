//! Telegram transport client using teloxide.

use teloxide::prelude::*;
use teloxide::types::ReplyMarkup;
use tracing::warn;

use crate::bot::dialogue::Reply;
use crate::bot::keyboard;

/// Outbound Telegram API wrapper.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send one reply. Failures are logged only; the channel itself is
    /// impaired, so there is no user-visible recovery.
    pub async fn send(&self, chat_id: i64, reply: &Reply) {
        let mut request = self.bot.send_message(ChatId(chat_id), reply.text.as_str());
        if reply.keyboard {
            request = request.reply_markup(ReplyMarkup::Keyboard(keyboard::main_keyboard()));
        }
        if let Err(e) = request.await {
            warn!("Failed to send to {chat_id}: {e}");
        }
    }
}
