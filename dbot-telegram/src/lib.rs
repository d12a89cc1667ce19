//! # dbot-telegram
//!
//! Telegram layer: teloxide implementation of [`dbot_core::Bot`] (send / edit / delete with error
//! classification), teloxide → core message adapters, minimal env config, and the REPL runner
//! that feeds incoming messages to a [`handler_chain::HandlerChain`].

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{classify_error, TelegramBotAdapter};
pub use config::TelegramConfig;
pub use runner::{error_reply, run_repl};
