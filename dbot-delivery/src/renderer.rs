//! Incremental reply renderer: keeps the messages shown for one reply in sync with its latest text.
//!
//! The text is cut into chunks of at most `length_limit - prefix` characters; chunk `i` lives in
//! delivered segment `i`. Each flush edits only the segments whose chunk changed, sends new
//! segments as a reply chain when the text grew, and deletes trailing segments when it shrank.
//!
//! # Lifecycle
//!
//! [`ReplySession::open`] → any number of [`ReplySession::update`] → [`ReplySession::close`].
//! `close` always flushes the last text and deregisters every segment from [`PendingReplies`].
//! A session dropped without `close` finalizes itself on a spawned task.

use crate::registry::PendingReplies;
use crate::retry::RetryingTransport;
use dbot_core::{Bot, ChatId, DbotError, MessageId, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One delivered message holding chunk `i` of the reply (without the prefix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredSegment {
    pub message_id: MessageId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing delivered yet.
    Empty,
    /// At least one segment delivered.
    Active,
    /// Final flush done and segments deregistered.
    Closed,
}

/// Cuts `text` into consecutive chunks of at most `max_chars` characters.
/// Empty text yields a single empty chunk so a reply always has one message.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    debug_assert!(max_chars > 0);
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Everything a flush needs. Split from [`ReplySession`] so a dropped session can hand it to a
/// background task.
struct SessionState {
    transport: Arc<RetryingTransport>,
    registry: Arc<PendingReplies>,
    chat: ChatId,
    original_message_id: MessageId,
    prefix: String,
    max_segment_length: usize,
    segments: Vec<DeliveredSegment>,
    pending_text: String,
}

impl SessionState {
    async fn force_flush(&mut self) -> Result<()> {
        let chunks = split_chunks(&self.pending_text, self.max_segment_length);
        let prefix = &self.prefix;
        debug!(
            chat_id = %self.chat,
            delivered = self.segments.len(),
            chunks = chunks.len(),
            "Reconciling reply segments"
        );

        for (segment, chunk) in self.segments.iter_mut().zip(&chunks) {
            if segment.text == *chunk {
                continue;
            }
            self.transport
                .edit_message(self.chat, segment.message_id, &format!("{prefix}{chunk}"))
                .await?;
            segment.text = chunk.clone();
        }

        for chunk in chunks.iter().skip(self.segments.len()) {
            let reply_to = self
                .segments
                .last()
                .map_or(self.original_message_id, |s| s.message_id);
            let message_id = self
                .transport
                .send_message(self.chat, &format!("{prefix}{chunk}"), Some(reply_to))
                .await?;
            self.registry.add(self.chat, message_id);
            self.segments.push(DeliveredSegment {
                message_id,
                text: chunk.clone(),
            });
        }

        // Trailing segments go from the end so a failed delete leaves the list consistent.
        while self.segments.len() > chunks.len() {
            if let Some(last) = self.segments.last() {
                let message_id = last.message_id;
                self.transport.delete_message(self.chat, message_id).await?;
                self.registry.remove(self.chat, message_id);
            }
            self.segments.pop();
        }

        Ok(())
    }

    fn deregister_all(&self) {
        for segment in &self.segments {
            self.registry.remove(self.chat, segment.message_id);
        }
    }

    fn detach(&mut self) -> SessionState {
        SessionState {
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&self.registry),
            chat: self.chat,
            original_message_id: self.original_message_id,
            prefix: self.prefix.clone(),
            max_segment_length: self.max_segment_length,
            segments: std::mem::take(&mut self.segments),
            pending_text: std::mem::take(&mut self.pending_text),
        }
    }
}

/// The delivered form of one logical reply. Mutated only through `&mut self`; the per-chat
/// ordering across sessions comes from the transport's rate limiter.
pub struct ReplySession {
    state: SessionState,
    closed: bool,
}

impl ReplySession {
    /// Starts a reply to `original_message_id` in `chat`. Every delivered message is `prefix`
    /// followed by one chunk; fails when `prefix` leaves no room under `length_limit`.
    pub fn open(
        transport: Arc<RetryingTransport>,
        registry: Arc<PendingReplies>,
        chat: ChatId,
        original_message_id: MessageId,
        prefix: impl Into<String>,
        length_limit: usize,
    ) -> Result<Self> {
        let prefix = prefix.into();
        let prefix_len = prefix.chars().count();
        if prefix_len >= length_limit {
            return Err(DbotError::PrefixTooLong {
                prefix_len,
                limit: length_limit,
            });
        }
        Ok(Self {
            state: SessionState {
                transport,
                registry,
                chat,
                original_message_id,
                prefix,
                max_segment_length: length_limit - prefix_len,
                segments: Vec::new(),
                pending_text: String::new(),
            },
            closed: false,
        })
    }

    pub fn chat(&self) -> ChatId {
        self.state.chat
    }

    pub fn original_message_id(&self) -> MessageId {
        self.state.original_message_id
    }

    pub fn max_segment_length(&self) -> usize {
        self.state.max_segment_length
    }

    pub fn segments(&self) -> &[DeliveredSegment] {
        &self.state.segments
    }

    pub fn pending_text(&self) -> &str {
        &self.state.pending_text
    }

    pub fn phase(&self) -> SessionPhase {
        if self.closed {
            SessionPhase::Closed
        } else if self.state.segments.is_empty() {
            SessionPhase::Empty
        } else {
            SessionPhase::Active
        }
    }

    /// Replaces the reply text. Flushes right away when the chat is due for a dispatch,
    /// otherwise only buffers; the buffered text is shown by a later update or by `close`.
    pub async fn update(&mut self, text: impl Into<String>) -> Result<()> {
        if self.closed {
            return Err(DbotError::SessionClosed);
        }
        self.state.pending_text = text.into();
        if self
            .state
            .transport
            .limiter()
            .within_interval(self.state.chat)
        {
            debug!(chat_id = %self.state.chat, "Dispatch not due, buffering reply update");
            return Ok(());
        }
        self.state.force_flush().await
    }

    /// Reconciles the delivered segments with the pending text now, ignoring update buffering.
    pub async fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(DbotError::SessionClosed);
        }
        self.state.force_flush().await
    }

    /// Final flush, then deregisters all segments. Deregistration happens even when the flush
    /// fails; the flush error is returned afterwards. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let flushed = self.state.force_flush().await;
        self.state.deregister_all();
        self.closed = true;
        match &flushed {
            Ok(()) => info!(
                chat_id = %self.state.chat,
                original_message_id = %self.state.original_message_id,
                segments = self.state.segments.len(),
                "Reply session closed"
            ),
            Err(e) => error!(
                chat_id = %self.state.chat,
                original_message_id = %self.state.original_message_id,
                error = %e,
                "Final flush failed, reply session closed"
            ),
        }
        flushed
    }
}

impl Drop for ReplySession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let mut state = self.state.detach();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    chat_id = %state.chat,
                    original_message_id = %state.original_message_id,
                    "Reply session dropped without close, finalizing in background"
                );
                handle.spawn(async move {
                    if let Err(e) = state.force_flush().await {
                        error!(chat_id = %state.chat, error = %e, "Background final flush failed");
                    }
                    state.deregister_all();
                });
            }
            Err(_) => {
                warn!(
                    chat_id = %state.chat,
                    "Reply session dropped outside a runtime, deregistering without flush"
                );
                state.deregister_all();
            }
        }
    }
}
