//! Wires the bot together and runs it.

use crate::config::BotConfig;
use anyhow::Result;
use dbot_core::{init_tracing, Bot as CoreBot, Whitelist};
use dbot_delivery::Delivery;
use dbot_handlers::{Command, CommandHandler, LoggingHandler};
use dbot_telegram::{run_repl, TelegramBotAdapter};
use handler_chain::HandlerChain;
use std::sync::Arc;
use storage::WhitelistRepository;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Logging first, then commands.
pub fn build_handler_chain(
    delivery: Arc<Delivery>,
    whitelist: Arc<dyn Whitelist>,
    admin_id: i64,
    bot_username: Arc<RwLock<Option<String>>>,
) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler::new(delivery.registry().clone())))
        .add_handler(Arc::new(CommandHandler::new(
            delivery,
            whitelist,
            admin_id,
            bot_username,
        )))
}

#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.telegram.log_file)?;

    info!(
        admin_id = config.admin_id,
        whitelist_seed = ?config.whitelist_chat_ids,
        database_path = %config.database_path,
        length_limit = config.delivery.length_limit,
        min_interval = ?config.delivery.min_interval,
        max_retry = config.delivery.retry.max_attempts,
        "Initializing bot"
    );

    let teloxide_bot = config.telegram.build_bot()?;
    if let Err(e) = teloxide_bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let transport: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let delivery = Arc::new(Delivery::new(transport, config.delivery.clone()));
    let whitelist: Arc<dyn Whitelist> = Arc::new(
        WhitelistRepository::new(&config.database_path, &config.whitelist_chat_ids).await?,
    );
    let bot_username = Arc::new(RwLock::new(None));

    let chain = build_handler_chain(
        delivery.clone(),
        whitelist,
        config.admin_id,
        bot_username.clone(),
    );

    info!("Bot started successfully");
    run_repl(teloxide_bot, chain, bot_username, delivery).await
}
