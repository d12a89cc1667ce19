//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code talks to Telegram; tests substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{Bot as CoreBot, ChatId, DbotError, MessageId, Result};
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, ReplyParameters};
use teloxide::{ApiError, RequestError};

/// Maps a teloxide error onto the core taxonomy: flood wait is transient, "message is not
/// modified" is its own variant, everything else is permanent.
pub fn classify_error(err: RequestError) -> DbotError {
    match err {
        RequestError::RetryAfter(seconds) => DbotError::Flood {
            retry_after: Some(seconds.duration()),
        },
        RequestError::Api(ApiError::MessageNotModified) => DbotError::NotModified,
        other => DbotError::Bot(other.to_string()),
    }
}

fn no_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

fn tg_message(message_id: MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(message_id.0)
}

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId> {
        let mut request = self
            .bot
            .send_message(tg_chat(chat), text)
            .link_preview_options(no_link_preview());
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(tg_message(reply_to)));
        }
        let sent = request.await.map_err(classify_error)?;
        Ok(MessageId(sent.id.0))
    }

    async fn edit_message(&self, chat: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(tg_chat(chat), tg_message(message_id), text)
            .link_preview_options(no_link_preview())
            .await
            .map_err(classify_error)?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message_id: MessageId) -> Result<()> {
        self.bot
            .delete_message(tg_chat(chat), tg_message(message_id))
            .await
            .map_err(classify_error)?;
        Ok(())
    }
}
