//! Per-chat dispatch gate.
//!
//! Each chat has its own async mutex around [`RateState`]; holding the [`RatePermit`] serializes
//! dispatches to that chat while other chats proceed concurrently. Uses [`tokio::time::Instant`] so
//! paused-clock tests see virtual time.

use dashmap::DashMap;
use dbot_core::ChatId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// Last dispatch time for one chat. Only written while the chat's lock is held.
#[derive(Debug, Default)]
struct RateState {
    last_dispatch: Option<Instant>,
}

/// Enforces `min_interval` between the end of one dispatch and the start of the next, per chat.
///
/// One entry is kept for every chat ever dispatched to, for the life of the limiter; entries are
/// never evicted. Memory grows with the number of distinct chats the bot has replied in
/// (a few dozen bytes each).
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    states: DashMap<ChatId, Arc<Mutex<RateState>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            states: DashMap::new(),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Number of chats with rate state. Only grows; see the type docs.
    pub fn tracked_chats(&self) -> usize {
        self.states.len()
    }

    fn state(&self, chat: ChatId) -> Arc<Mutex<RateState>> {
        self.states.entry(chat).or_default().value().clone()
    }

    /// Waits for exclusive access to `chat`, then until `min_interval` has passed since its last
    /// dispatch. The dispatch time is recorded when the returned permit is dropped.
    pub async fn acquire(&self, chat: ChatId) -> RatePermit {
        let guard = self.state(chat).lock_owned().await;
        if let Some(last) = guard.last_dispatch {
            let deadline = last + self.min_interval;
            let now = Instant::now();
            if now < deadline {
                debug!(
                    chat_id = %chat,
                    wait_ms = (deadline - now).as_millis() as u64,
                    "Waiting for dispatch interval"
                );
                tokio::time::sleep_until(deadline).await;
            }
        }
        RatePermit { chat, guard }
    }

    /// True when a dispatch to `chat` is not due yet: the interval since the last one has not
    /// elapsed, or another dispatch currently holds the chat's gate. Never waits.
    pub fn within_interval(&self, chat: ChatId) -> bool {
        let Some(state) = self.states.get(&chat).map(|entry| entry.value().clone()) else {
            return false;
        };
        let Ok(state) = state.try_lock() else {
            return true;
        };
        match state.last_dispatch {
            Some(last) => Instant::now() < last + self.min_interval,
            None => false,
        }
    }
}

/// Exclusive right to dispatch to one chat. Records the dispatch time on drop.
#[derive(Debug)]
pub struct RatePermit {
    chat: ChatId,
    guard: OwnedMutexGuard<RateState>,
}

impl RatePermit {
    pub fn chat(&self) -> ChatId {
        self.chat
    }
}

impl Drop for RatePermit {
    fn drop(&mut self) {
        let now = Instant::now();
        // Monotonic even if the clock source ever stepped backwards.
        let last = match self.guard.last_dispatch {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.guard.last_dispatch = Some(last);
    }
}
