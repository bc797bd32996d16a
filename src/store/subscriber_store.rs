//! Subscribed chat ids, persisted as `{"<chat id>": true, ...}`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;
use log::warn;
use tokio::sync::Mutex;

use crate::store::JsonFile;
use crate::store::StoreError;

pub const USERS_FILE: &str = "users.json";

pub struct SubscriberStore {
    file: JsonFile,
    lock: Mutex<()>,
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Adds a chat id. Returns `false` when it was already subscribed.
    pub async fn add(&self, chat_id: i64) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut users: BTreeMap<String, bool> = self.file.load_or_default().await?;
        if users.insert(chat_id.to_string(), true).is_some() {
            return Ok(false);
        }
        self.file.save(&users).await?;
        info!("Subscribed chat {chat_id} ({} total).", users.len());
        Ok(true)
    }

    /// All subscribed chat ids. Keys that are not valid ids are skipped.
    pub async fn all(&self) -> Result<Vec<i64>, StoreError> {
        let _guard = self.lock.lock().await;
        let users: BTreeMap<String, bool> = self.file.load_or_default().await?;
        Ok(users
            .keys()
            .filter_map(|key| match key.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Skipping invalid chat id `{key}` in {}.", self.file.path().display());
                    None
                }
            })
            .collect())
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.all().await?.len())
    }
}
