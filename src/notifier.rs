//! Message delivery to subscribed chats.

pub mod log_notifier;
pub mod telegram_notifier;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Delivery to chat {chat_id} rejected: {reason}")]
    Rejected { chat_id: i64, reason: String },
}

/// Delivers a text message to one chat.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}
