//! # dbot-delivery
//!
//! Renders a growing reply as a sequence of Telegram messages under a per-message length limit,
//! a minimum interval between calls per chat, and flood-wait retry.
//!
//! Layers, innermost first:
//!
//! - **[`RateLimiter`]** – per-chat dispatch gate (one call at a time, min gap between calls).
//! - **[`RetryingTransport`]** – wraps a [`dbot_core::Bot`]; each attempt passes the gate, flood errors are retried.
//! - **[`ReplySession`]** – reconciles delivered segments against the latest text (edit / send / delete).
//! - **[`PendingReplies`]** – set of bot messages belonging to replies still in progress.
//!
//! [`Delivery`] owns one of each and is the entry point for command handlers.

mod config;
mod delivery;
mod rate_limiter;
mod registry;
mod renderer;
mod retry;

pub use config::DeliveryConfig;
pub use delivery::Delivery;
pub use rate_limiter::{RateLimiter, RatePermit};
pub use registry::PendingReplies;
pub use renderer::{split_chunks, DeliveredSegment, ReplySession, SessionPhase};
pub use retry::{retry, RetryPolicy, RetryingTransport};
