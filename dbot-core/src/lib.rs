//! # dbot-core
//!
//! Core types and traits for the bot: [`Bot`] (send / edit / delete), [`Handler`], [`Whitelist`],
//! message and user types, the [`DbotError`] taxonomy, and tracing initialization.
//! Transport-agnostic; used by every other crate in the workspace.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;
pub mod whitelist;

pub use bot::Bot;
pub use error::{DbotError, Result};
pub use logger::{init_tracing, preview};
pub use types::{
    Chat, ChatId, ChatKind, Handler, HandlerResponse, Message, MessageId, ToCoreMessage,
    ToCoreUser, User,
};
pub use whitelist::Whitelist;
