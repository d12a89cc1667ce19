//! # dbot-cli
//!
//! CLI foundation: argument parsing, config loading, and wiring of delivery, handlers and the REPL.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{build_handler_chain, run_bot};
pub use cli::{Cli, Commands};
pub use config::BotConfig;
