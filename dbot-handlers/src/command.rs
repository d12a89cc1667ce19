//! Bot commands: `/ping`, `/add_whitelist`, `/del_whitelist`, `/get_whitelist`.
//!
//! Parsed with teloxide's [`BotCommands`] derive, which also accepts the `/cmd@bot_username` form.
//! Replies go through [`Delivery::reply`], so they are rate-limited, retried and split like any reply.

use async_trait::async_trait;
use dbot_core::{Handler, HandlerResponse, Message, Result, Whitelist};
use dbot_delivery::Delivery;
use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use tokio::sync::RwLock;
use tracing::{info, instrument};

pub const MSG_ONLY_ADMIN: &str = "Only admin can use this command";
pub const MSG_ONLY_PRIVATE: &str = "This command only works in private chat";
pub const MSG_ALREADY_WHITELISTED: &str = "Already in whitelist";
pub const MSG_WHITELIST_ADDED: &str = "Whitelist added";
pub const MSG_NOT_WHITELISTED: &str = "Not in whitelist";
pub const MSG_WHITELIST_DELETED: &str = "Whitelist deleted";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Supported commands:")]
pub enum Command {
    #[command(description = "Test bot connectivity")]
    Ping,
    #[command(description = "Add this group to whitelist (only admin)")]
    AddWhitelist,
    #[command(description = "Delete this group from whitelist (only admin)")]
    DelWhitelist,
    #[command(description = "List groups in whitelist (only admin)")]
    GetWhitelist,
}

/// Executes [`Command`]s. Messages that are not a known command pass through with Continue.
pub struct CommandHandler {
    delivery: Arc<Delivery>,
    whitelist: Arc<dyn Whitelist>,
    admin_id: i64,
    bot_username: Arc<RwLock<Option<String>>>,
}

impl CommandHandler {
    pub fn new(
        delivery: Arc<Delivery>,
        whitelist: Arc<dyn Whitelist>,
        admin_id: i64,
        bot_username: Arc<RwLock<Option<String>>>,
    ) -> Self {
        Self {
            delivery,
            whitelist,
            admin_id,
            bot_username,
        }
    }

    async fn parse(&self, text: &str) -> Option<Command> {
        let username = self.bot_username.read().await.clone().unwrap_or_default();
        Command::parse(text, &username).ok()
    }

    /// Applies `command` and returns the reply text.
    pub async fn execute(&self, command: &Command, message: &Message) -> Result<String> {
        let chat = message.chat.id;
        let is_admin = message.user.id == self.admin_id;
        let reply = match command {
            Command::Ping => format!(
                "chat_id={} user_id={} is_whitelisted={}",
                chat,
                message.user.id,
                self.whitelist.is_authorized(chat).await?
            ),
            Command::AddWhitelist if !is_admin => MSG_ONLY_ADMIN.to_string(),
            Command::AddWhitelist => {
                if self.whitelist.add(chat).await? {
                    info!(chat_id = %chat, "Chat added to whitelist");
                    MSG_WHITELIST_ADDED.to_string()
                } else {
                    MSG_ALREADY_WHITELISTED.to_string()
                }
            }
            Command::DelWhitelist if !is_admin => MSG_ONLY_ADMIN.to_string(),
            Command::DelWhitelist => {
                if self.whitelist.remove(chat).await? {
                    info!(chat_id = %chat, "Chat removed from whitelist");
                    MSG_WHITELIST_DELETED.to_string()
                } else {
                    MSG_NOT_WHITELISTED.to_string()
                }
            }
            Command::GetWhitelist if !is_admin => MSG_ONLY_ADMIN.to_string(),
            Command::GetWhitelist if !message.is_private() => MSG_ONLY_PRIVATE.to_string(),
            Command::GetWhitelist => {
                let ids: Vec<String> = self
                    .whitelist
                    .list()
                    .await?
                    .iter()
                    .map(|c| c.to_string())
                    .collect();
                format!("{{{}}}", ids.join(", "))
            }
        };
        Ok(reply)
    }
}

#[async_trait]
impl Handler for CommandHandler {
    #[instrument(skip(self, message), fields(chat_id = %message.chat.id, message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let Some(command) = self.parse(&message.content).await else {
            return Ok(HandlerResponse::Continue);
        };
        info!(command = ?command, user_id = message.user.id, "Executing command");
        let reply = self.execute(&command, message).await?;
        self.delivery
            .reply(message.chat.id, message.id, &reply)
            .await?;
        Ok(HandlerResponse::Reply(reply))
    }
}
