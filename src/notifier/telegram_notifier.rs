use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use log::debug;
use log::info;
use teloxide::ApiError;
use teloxide::Bot;
use teloxide::RequestError;
use teloxide::prelude::Requester;
use teloxide::types::ChatId;

use super::Notifier;
use super::NotifyError;

/// Sends messages through the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
    limiter: RateLimiter<NotKeyed, InMemoryState, QuantaClock>,
}

impl TelegramNotifier {
    /// `per_second` caps outbound messages; Telegram starts refusing above ~30/s.
    pub fn new(bot: Bot, per_second: u32) -> Self {
        info!("Initializing TelegramNotifier ({per_second} msg/s).");
        let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
        Self {
            bot,
            limiter: RateLimiter::direct(quota),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        if self.limiter.check().is_err() {
            debug!("Outbound messages are ratelimited. Waiting...");
        }
        self.limiter.until_ready().await;

        match self.bot.send_message(ChatId(chat_id), text).await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::BotBlocked)) => Err(NotifyError::Rejected {
                chat_id,
                reason: "bot was blocked by the user".to_string(),
            }),
            Err(RequestError::Api(ApiError::ChatNotFound)) => Err(NotifyError::Rejected {
                chat_id,
                reason: "chat not found".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
