//! REPL runner: converts teloxide messages to core::Message and passes them to HandlerChain.
//! A failed chain is reported back into the same chat as a short error reply.

use crate::adapters::TelegramMessageWrapper;
use anyhow::Result;
use dbot_core::{preview, DbotError, ToCoreMessage};
use dbot_delivery::Delivery;
use handler_chain::HandlerChain;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

/// Text sent back to the chat when handling a message failed.
pub fn error_reply(err: &DbotError) -> String {
    format!("[!] Error: {}", err)
}

/// Starts the REPL. Calls get_me() first to fill `bot_username` (used for `/cmd@bot` parsing);
/// each message with text and a sender is handled on its own task.
#[instrument(skip(bot, handler_chain, bot_username, delivery))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    bot_username: Arc<tokio::sync::RwLock<Option<String>>>,
    delivery: Arc<Delivery>,
) -> Result<()> {
    let me = bot.get_me().await?;
    if let Some(username) = &me.user.username {
        *bot_username.write().await = Some(username.clone());
        info!(username = %username, "Bot username set before repl");
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();
        let delivery = delivery.clone();

        async move {
            if msg.from.is_none() || msg.text().is_none() {
                return Ok(());
            }
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            info!(
                user_id = core_msg.user.id,
                chat_id = %core_msg.chat.id,
                message_id = %core_msg.id,
                message_content = %preview(&core_msg.content),
                "Received message"
            );

            tokio::spawn(async move {
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(
                        error = %e,
                        chat_id = %core_msg.chat.id,
                        message_id = %core_msg.id,
                        "Handler chain failed"
                    );
                    let reply = error_reply(&e);
                    if let Err(e) = delivery.reply(core_msg.chat.id, core_msg.id, &reply).await {
                        error!(error = %e, chat_id = %core_msg.chat.id, "Failed to report error");
                    }
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
