//! Set of bot messages that belong to a reply still being written.

use dashmap::DashSet;
use dbot_core::{ChatId, MessageId};

/// Membership-only registry of `(chat, message_id)` pairs. Written by [`crate::ReplySession`],
/// read by reply-routing code to tell whether an incoming message answers a live reply.
#[derive(Debug, Default)]
pub struct PendingReplies {
    entries: DashSet<(ChatId, MessageId)>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the pair was already present.
    pub fn add(&self, chat: ChatId, message_id: MessageId) -> bool {
        self.entries.insert((chat, message_id))
    }

    /// Returns false when the pair was not present.
    pub fn remove(&self, chat: ChatId, message_id: MessageId) -> bool {
        self.entries.remove(&(chat, message_id)).is_some()
    }

    pub fn contains(&self, chat: ChatId, message_id: MessageId) -> bool {
        self.entries.contains(&(chat, message_id))
    }
}
