//! Wires limiter, retrying transport, registry and sessions for one bot process.

use crate::config::DeliveryConfig;
use crate::rate_limiter::RateLimiter;
use crate::registry::PendingReplies;
use crate::renderer::ReplySession;
use crate::retry::RetryingTransport;
use dbot_core::{Bot, ChatId, MessageId, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::warn;

/// Process-wide delivery state. Create one at startup and share it behind an `Arc`.
pub struct Delivery {
    config: DeliveryConfig,
    transport: Arc<RetryingTransport>,
    registry: Arc<PendingReplies>,
}

impl Delivery {
    pub fn new(bot: Arc<dyn Bot>, config: DeliveryConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.min_interval));
        let transport = Arc::new(RetryingTransport::new(bot, limiter, config.retry));
        Self {
            config,
            transport,
            registry: Arc::new(PendingReplies::new()),
        }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Rate-limited, retrying transport for single calls outside a reply session.
    pub fn transport(&self) -> &Arc<RetryingTransport> {
        &self.transport
    }

    pub fn registry(&self) -> &Arc<PendingReplies> {
        &self.registry
    }

    /// Opens a reply session; the caller must `close` it (dropping it finalizes in the background).
    pub fn open_session(
        &self,
        chat: ChatId,
        original_message_id: MessageId,
        prefix: &str,
    ) -> Result<ReplySession> {
        ReplySession::open(
            Arc::clone(&self.transport),
            Arc::clone(&self.registry),
            chat,
            original_message_id,
            prefix,
            self.config.length_limit,
        )
    }

    /// Runs `body` with a fresh session and closes it afterwards whatever `body` returned.
    /// An error from `body` takes precedence over an error from the final flush.
    pub async fn with_session<T, F>(
        &self,
        chat: ChatId,
        original_message_id: MessageId,
        prefix: &str,
        body: F,
    ) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut ReplySession) -> BoxFuture<'s, Result<T>>,
    {
        let mut session = self.open_session(chat, original_message_id, prefix)?;
        let outcome = body(&mut session).await;
        let closed = session.close().await;
        match outcome {
            Ok(value) => closed.map(|_| value),
            Err(e) => {
                if let Err(close_err) = closed {
                    warn!(chat_id = %chat, error = %close_err, "Close failed after reply body error");
                }
                Err(e)
            }
        }
    }

    /// Delivers `text` as a complete reply to `original_message_id`, split as needed.
    pub async fn reply(
        &self,
        chat: ChatId,
        original_message_id: MessageId,
        text: &str,
    ) -> Result<()> {
        let mut session = self.open_session(chat, original_message_id, "")?;
        let updated = session.update(text).await;
        let closed = session.close().await;
        updated.and(closed)
    }
}
