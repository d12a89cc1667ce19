//! Recording mock transport shared by the delivery integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dbot_core::{Bot, ChatId, DbotError, MessageId, Result};
use dbot_delivery::{Delivery, DeliveryConfig, RetryPolicy};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// A successful transport call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send {
        chat: ChatId,
        text: String,
        reply_to: Option<MessageId>,
        id: MessageId,
    },
    Edit {
        chat: ChatId,
        message_id: MessageId,
        text: String,
    },
    Delete {
        chat: ChatId,
        message_id: MessageId,
    },
}

/// Start and end instants of one invocation (successful or not).
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub chat: ChatId,
    pub start: Instant,
    pub end: Instant,
}

/// Records calls, keeps the visible text per message, and can fail the next N invocations.
pub struct MockBot {
    next_id: AtomicI32,
    invocations: AtomicUsize,
    delay: Duration,
    calls: Mutex<Vec<Call>>,
    spans: Mutex<Vec<Span>>,
    failures: Mutex<VecDeque<DbotError>>,
    visible: Mutex<BTreeMap<(ChatId, MessageId), String>>,
}

impl MockBot {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Every call takes `delay` of (virtual) time.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            next_id: AtomicI32::new(100),
            invocations: AtomicUsize::new(0),
            delay,
            calls: Mutex::new(Vec::new()),
            spans: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            visible: Mutex::new(BTreeMap::new()),
        }
    }

    /// The next invocation fails with `err` (queued in order).
    pub fn fail_next(&self, err: DbotError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn spans(&self) -> Vec<Span> {
        self.spans.lock().unwrap().clone()
    }

    /// Texts currently shown in `chat`, in message id order.
    pub fn visible_texts(&self, chat: ChatId) -> Vec<String> {
        self.visible
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| *c == chat)
            .map(|(_, text)| text.clone())
            .collect()
    }

    async fn invoke(&self, chat: ChatId) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.spans.lock().unwrap().push(Span {
            chat,
            start,
            end: Instant::now(),
        });
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId> {
        self.invoke(chat).await?;
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.visible
            .lock()
            .unwrap()
            .insert((chat, id), text.to_string());
        self.calls.lock().unwrap().push(Call::Send {
            chat,
            text: text.to_string(),
            reply_to,
            id,
        });
        Ok(id)
    }

    async fn edit_message(&self, chat: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        self.invoke(chat).await?;
        let mut visible = self.visible.lock().unwrap();
        match visible.get_mut(&(chat, message_id)) {
            Some(current) if current == text => Err(DbotError::NotModified),
            Some(current) => {
                *current = text.to_string();
                self.calls.lock().unwrap().push(Call::Edit {
                    chat,
                    message_id,
                    text: text.to_string(),
                });
                Ok(())
            }
            None => Err(DbotError::Bot("Bad Request: message to edit not found".into())),
        }
    }

    async fn delete_message(&self, chat: ChatId, message_id: MessageId) -> Result<()> {
        self.invoke(chat).await?;
        self.visible.lock().unwrap().remove(&(chat, message_id));
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete { chat, message_id });
        Ok(())
    }
}

pub const CHAT: ChatId = ChatId(42);
pub const ORIGINAL: MessageId = MessageId(1);

pub fn config(length_limit: usize) -> DeliveryConfig {
    DeliveryConfig {
        length_limit,
        min_interval: Duration::from_secs(3),
        retry: RetryPolicy::new(30, Duration::from_secs(10)),
    }
}

pub fn delivery(length_limit: usize) -> (Arc<MockBot>, Delivery) {
    let bot = Arc::new(MockBot::new());
    let delivery = Delivery::new(bot.clone(), config(length_limit));
    (bot, delivery)
}
