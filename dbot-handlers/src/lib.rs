//! # dbot-handlers
//!
//! Handlers plugged into the handler chain for the bot:
//!
//! - **[`LoggingHandler`]** – logs each message and whether it answers a reply still in progress.
//! - **[`CommandHandler`]** – `/ping` and the admin whitelist commands, replying through
//!   [`dbot_delivery::Delivery`] and reading the chat whitelist through [`dbot_core::Whitelist`].

mod command;
mod logging;

#[cfg(test)]
mod test;

pub use command::{Command, CommandHandler};
pub use logging::LoggingHandler;
