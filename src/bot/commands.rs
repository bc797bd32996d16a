//! Command definitions and their replies.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use log::info;
use teloxide::prelude::Requester;
use teloxide::prelude::ResponseResult;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use crate::bot::Data;
use crate::error::AppError;
use crate::service::Services;
use crate::service::error::ServiceError;
use crate::service::subscription_service::SubscribeResult;

const FALLBACK_REPLY: &str = "⚠️ Something went wrong. Please try again later.";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "turn on match reminders for this chat.")]
    Start,
    #[command(description = "show the next match.")]
    Next,
    #[command(description = "display this text.")]
    Help,
}

impl Command {
    /// Name as typed in chat, without the slash.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Next => "next",
            Command::Help => "help",
        }
    }
}

pub async fn answer(
    bot: teloxide::Bot,
    msg: Message,
    cmd: Command,
    data: Arc<Data>,
) -> ResponseResult<()> {
    info!("Received /{} from chat {}.", cmd.name(), msg.chat.id);
    let reply = handle_command(&cmd, msg.chat.id.0, &data, Utc::now()).await;
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Produces the reply text for a command. Failures become a static message
/// carrying a log reference id.
pub async fn handle_command(cmd: &Command, chat_id: i64, data: &Data, now: DateTime<Utc>) -> String {
    let services = &data.services;
    match reply_for(cmd, chat_id, data, now).await {
        Ok(reply) => reply,
        Err(e) => {
            let ref_id = AppError::log_with_ref(&e);
            let rendered = match cmd {
                Command::Next => services.formatter.fetch_failed(&ref_id),
                _ => services.formatter.error(&ref_id),
            };
            rendered.unwrap_or_else(|_| FALLBACK_REPLY.to_string())
        }
    }
}

async fn reply_for(
    cmd: &Command,
    chat_id: i64,
    data: &Data,
    now: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let services: &Services = &data.services;
    let reply = match cmd {
        Command::Start => {
            let result = services.subscription.subscribe(chat_id).await?;
            services
                .formatter
                .subscribed(result == SubscribeResult::Success)?
        }
        Command::Next => match services.fixtures.next_fixture(now).await? {
            Some(fixture) => services.formatter.next_match(&fixture)?,
            None => services.formatter.no_fixture()?,
        },
        Command::Help => format!(
            "Match reminders for {}.\n\n{}",
            data.config.team_name,
            Command::descriptions()
        ),
    };
    Ok(reply)
}
