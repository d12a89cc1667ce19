//! Bot abstraction for sending, editing and deleting messages.
//!
//! [`Bot`] is transport-agnostic; dbot-telegram implements it via teloxide and dbot-delivery
//! decorates it with rate limiting and retry.

use crate::error::Result;
use crate::types::{ChatId, MessageId};
use async_trait::async_trait;

/// The three primitive outbound operations of a delivery transport.
///
/// Implementations classify failures: overload as [`crate::DbotError::Flood`], an edit with
/// identical content as [`crate::DbotError::NotModified`], everything else as
/// [`crate::DbotError::Bot`].
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends `text` to `chat`, optionally as a reply to `reply_to`. Returns the new message id.
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId>;

    /// Replaces the text of an already-sent message.
    async fn edit_message(&self, chat: ChatId, message_id: MessageId, text: &str) -> Result<()>;

    /// Deletes an already-sent message.
    async fn delete_message(&self, chat: ChatId, message_id: MessageId) -> Result<()>;
}
