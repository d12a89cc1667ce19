//! Full bot config: Telegram connectivity, delivery limits, admin, whitelist store and its seed.
//! Env: everything read by [`TelegramConfig`] and [`DeliveryConfig`], plus ADMIN_ID,
//! WHITELIST_CHAT_IDS and DATABASE_PATH.

use anyhow::{Context, Result};
use dbot_core::ChatId;
use dbot_delivery::DeliveryConfig;
use dbot_telegram::TelegramConfig;
use std::env;

/// Default whitelist database when DATABASE_PATH is unset.
pub const DEFAULT_DATABASE_PATH: &str = "data/dbot.db";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub delivery: DeliveryConfig,
    /// The only user allowed to run whitelist commands.
    pub admin_id: i64,
    /// Chats written to a fresh whitelist database. Always contains the admin's private chat.
    pub whitelist_chat_ids: Vec<ChatId>,
    /// SQLite file holding the whitelist.
    pub database_path: String,
}

fn parse_chat_ids(raw: &str) -> Result<Vec<ChatId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map(ChatId)
                .with_context(|| format!("WHITELIST_CHAT_IDS contains an invalid chat id: {:?}", s))
        })
        .collect()
}

impl BotConfig {
    /// Loads from env. `token` overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let telegram = TelegramConfig::from_env(token)?;
        let delivery = DeliveryConfig::from_env()?;

        let raw_admin = env::var("ADMIN_ID").context("ADMIN_ID not set")?;
        let admin_id: i64 = raw_admin
            .trim()
            .parse()
            .with_context(|| format!("ADMIN_ID is not a valid user id: {:?}", raw_admin))?;

        let mut whitelist_chat_ids = match env::var("WHITELIST_CHAT_IDS") {
            Ok(raw) => parse_chat_ids(&raw)?,
            Err(_) => Vec::new(),
        };
        whitelist_chat_ids.push(ChatId(admin_id));
        whitelist_chat_ids.sort();
        whitelist_chat_ids.dedup();

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        Ok(Self {
            telegram,
            delivery,
            admin_id,
            whitelist_chat_ids,
            database_path,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.telegram.validate()?;
        self.delivery.validate()?;
        Ok(())
    }
}
