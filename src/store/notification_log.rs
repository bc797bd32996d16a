//! Record of reminders already delivered, persisted as `{"<fixture>_<kind>": true, ...}`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::store::JsonFile;
use crate::store::StoreError;

pub const SENT_FILE: &str = "sent_notifications.json";

/// In-memory view of the sent keys for the duration of one engine pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentNotifications(BTreeMap<String, bool>);

impl SentNotifications {
    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    pub fn insert(&mut self, key: impl Into<String>) {
        self.0.insert(key.into(), true);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct NotificationLog {
    file: JsonFile,
    lock: Mutex<()>,
}

impl NotificationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
            lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<SentNotifications, StoreError> {
        let _guard = self.lock.lock().await;
        self.file.load_or_default().await
    }

    pub async fn save(&self, sent: &SentNotifications) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.file.save(sent).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_false_value_is_not_sent() {
        let sent: SentNotifications =
            serde_json::from_str(r#"{"1_24h": true, "1_1h": false}"#).unwrap();
        assert!(sent.contains("1_24h"));
        assert!(!sent.contains("1_1h"));
        assert!(!sent.contains("2_24h"));
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let mut sent = SentNotifications::default();
        sent.insert("99_result");
        assert_eq!(serde_json::to_string(&sent).unwrap(), r#"{"99_result":true}"#);
    }
}
