//! Logs each incoming message before the commands run.

use async_trait::async_trait;
use dbot_core::{preview, Handler, HandlerResponse, Message, Result};
use dbot_delivery::PendingReplies;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Logs each message in before() and the response in after(); always continues.
/// Also records whether the message replies to a bot reply that is still being written.
pub struct LoggingHandler {
    pending: Arc<PendingReplies>,
}

impl LoggingHandler {
    pub fn new(pending: Arc<PendingReplies>) -> Self {
        Self { pending }
    }

    /// True when `message` replies to a segment of a reply session that has not closed yet.
    pub fn replies_to_pending(&self, message: &Message) -> bool {
        message
            .reply_to_message_id
            .map(|id| self.pending.contains(message.chat.id, id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            chat_id = %message.chat.id,
            message_id = %message.id,
            replies_to_pending = self.replies_to_pending(message),
            message_content = %preview(&message.content),
            "New message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        debug!(
            message_id = %message.id,
            response = ?response,
            "Processed message"
        );
        Ok(())
    }
}
