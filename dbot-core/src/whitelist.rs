//! Chat authorization: which chats the bot serves.

use crate::error::Result;
use crate::types::ChatId;
use async_trait::async_trait;

/// Authorization contract consulted by command handlers. Storage is up to the implementation.
#[async_trait]
pub trait Whitelist: Send + Sync {
    async fn is_authorized(&self, chat: ChatId) -> Result<bool>;
    /// Returns false when the chat was already present.
    async fn add(&self, chat: ChatId) -> Result<bool>;
    /// Returns false when the chat was not present.
    async fn remove(&self, chat: ChatId) -> Result<bool>;
    /// All whitelisted chats, ascending.
    async fn list(&self) -> Result<Vec<ChatId>>;
}
