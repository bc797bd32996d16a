use async_trait::async_trait;
use log::info;

use super::Notifier;
use super::NotifyError;

/// Logs messages instead of sending them. Used for dry runs.
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        info!("Initializing LogNotifier. Messages will not be delivered.");
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        info!("[dry-run] to {chat_id}: {}", text.replace('\n', " | "));
        Ok(())
    }
}
