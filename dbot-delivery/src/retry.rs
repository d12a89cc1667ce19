//! Flood-wait retry around the three transport operations.
//!
//! Order per attempt: rate-limit gate → raw call → release gate. The retry sleep happens outside
//! the gate so other replies to the same chat can use the gap.

use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use dbot_core::{preview, Bot, ChatId, DbotError, MessageId, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(10))
    }
}

/// Runs `op` (given the 1-based attempt number) until it succeeds, fails with a non-transient
/// error, or the last attempt fails; the last error is returned as is.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, op_name: &'static str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(
                    op = op_name,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    retry_in_secs = policy.interval.as_secs_f64(),
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn log_failure(
    op: &'static str,
    chat: ChatId,
    message_id: Option<MessageId>,
    attempt: u32,
    err: &DbotError,
) {
    if err.is_transient() {
        warn!(op = op, chat_id = %chat, message_id = ?message_id, attempt = attempt, error = %err, "Transport overloaded");
    } else {
        error!(op = op, chat_id = %chat, message_id = ?message_id, attempt = attempt, error = %err, "Transport call failed");
    }
}

/// [`Bot`] decorator adding the per-chat rate limit and flood retry to every call, and treating
/// "message is not modified" on edit as success.
pub struct RetryingTransport {
    bot: Arc<dyn Bot>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl RetryingTransport {
    pub fn new(bot: Arc<dyn Bot>, limiter: Arc<RateLimiter>, policy: RetryPolicy) -> Self {
        Self {
            bot,
            limiter,
            policy,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

#[async_trait]
impl Bot for RetryingTransport {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId> {
        retry(self.policy, "send_message", move |attempt| async move {
            let _permit = self.limiter.acquire(chat).await;
            info!(chat_id = %chat, reply_to = ?reply_to, attempt = attempt, text = %preview(text), "Sending message");
            match self.bot.send_message(chat, text, reply_to).await {
                Ok(message_id) => {
                    info!(chat_id = %chat, reply_to = ?reply_to, message_id = %message_id, "Message sent");
                    Ok(message_id)
                }
                Err(e) => {
                    log_failure("send_message", chat, None, attempt, &e);
                    Err(e)
                }
            }
        })
        .await
    }

    async fn edit_message(&self, chat: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        retry(self.policy, "edit_message", move |attempt| async move {
            let _permit = self.limiter.acquire(chat).await;
            info!(chat_id = %chat, message_id = %message_id, attempt = attempt, text = %preview(text), "Editing message");
            match self.bot.edit_message(chat, message_id, text).await {
                Ok(()) => {
                    info!(chat_id = %chat, message_id = %message_id, "Message edited");
                    Ok(())
                }
                Err(DbotError::NotModified) => {
                    info!(chat_id = %chat, message_id = %message_id, "Message not modified");
                    Ok(())
                }
                Err(e) => {
                    log_failure("edit_message", chat, Some(message_id), attempt, &e);
                    Err(e)
                }
            }
        })
        .await
    }

    async fn delete_message(&self, chat: ChatId, message_id: MessageId) -> Result<()> {
        retry(self.policy, "delete_message", move |attempt| async move {
            let _permit = self.limiter.acquire(chat).await;
            info!(chat_id = %chat, message_id = %message_id, attempt = attempt, "Deleting message");
            match self.bot.delete_message(chat, message_id).await {
                Ok(()) => {
                    info!(chat_id = %chat, message_id = %message_id, "Message deleted");
                    Ok(())
                }
                Err(e) => {
                    log_failure("delete_message", chat, Some(message_id), attempt, &e);
                    Err(e)
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retry_returns_first_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry(RetryPolicy::new(3, Duration::from_secs(10)), "op", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, DbotError>(5)
        })
        .await;
        assert_eq!(result.unwrap(), 5);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_and_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = tokio::time::Instant::now();
        let result: Result<()> = retry(RetryPolicy::new(3, Duration::from_secs(10)), "op", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DbotError::Flood { retry_after: None })
        })
        .await;
        assert!(matches!(result, Err(DbotError::Flood { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_does_not_retry_permanent_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = retry(RetryPolicy::default(), "op", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DbotError::Bot("Forbidden: bot was blocked by the user".into()))
        })
        .await;
        assert!(matches!(result, Err(DbotError::Bot(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = retry(RetryPolicy::new(0, Duration::from_secs(1)), "op", move |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DbotError::Flood { retry_after: None })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
