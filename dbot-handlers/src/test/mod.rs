
use async_trait::async_trait;
use dbot_core::{Bot, Chat, ChatId, ChatKind, Message, MessageId, Result, User, Whitelist};
use std::collections::BTreeSet;
use std::sync::Mutex;

pub const ADMIN_ID: i64 = 7;

/// Records every sent text; ids increase from 100.
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<(ChatId, String, Option<MessageId>)>>,
}

impl RecordingBot {
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text, _)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat, text.to_string(), reply_to));
        Ok(MessageId(100 + sent.len() as i32 - 1))
    }

    async fn edit_message(&self, _chat: ChatId, _message_id: MessageId, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat: ChatId, _message_id: MessageId) -> Result<()> {
        Ok(())
    }
}

/// Whitelist held in memory for handler tests.
#[derive(Default)]
pub struct TestWhitelist {
    chats: Mutex<BTreeSet<ChatId>>,
}

impl TestWhitelist {
    pub fn with(chats: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            chats: Mutex::new(chats.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Whitelist for TestWhitelist {
    async fn is_authorized(&self, chat: ChatId) -> Result<bool> {
        Ok(self.chats.lock().unwrap().contains(&chat))
    }

    async fn add(&self, chat: ChatId) -> Result<bool> {
        Ok(self.chats.lock().unwrap().insert(chat))
    }

    async fn remove(&self, chat: ChatId) -> Result<bool> {
        Ok(self.chats.lock().unwrap().remove(&chat))
    }

    async fn list(&self) -> Result<Vec<ChatId>> {
        Ok(self.chats.lock().unwrap().iter().copied().collect())
    }
}

/// A message from `user_id` in `chat_id`; private when the two ids match.
pub fn sample_message(chat_id: i64, user_id: i64, content: &str) -> Message {
    Message {
        id: MessageId(1),
        user: User {
            id: user_id,
            username: Some("test_user".to_string()),
        },
        chat: Chat {
            id: ChatId(chat_id),
            kind: if chat_id == user_id {
                ChatKind::Private
            } else {
                ChatKind::Group
            },
        },
        content: content.to_string(),
        reply_to_message_id: None,
    }
}
