//! Flat JSON file persistence.

pub mod notification_log;
pub mod subscriber_store;

use std::path::Path;
use std::path::PathBuf;

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use notification_log::NotificationLog;
pub use notification_log::SentNotifications;
pub use subscriber_store::SubscriberStore;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single JSON document on disk.
///
/// A missing file reads as absent. Writes go to a sibling temp file which is
/// then renamed over the target.
#[derive(Clone, Debug)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet.", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.io_err(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json {
                path: self.path.display().to_string(),
                source,
            })
    }

    pub async fn load_or_default<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        Ok(self.load().await?.unwrap_or_default())
    }

    pub async fn save<T: Serialize>(&self, data: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }
        let bytes = serde_json::to_vec(data).map_err(|source| StoreError::Json {
            path: self.path.display().to_string(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.io_err(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_err(e))
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kickoff-bot-store-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let file = JsonFile::new(temp_path("absent.json"));
        let value: Option<BTreeMap<String, bool>> = file.load().await.unwrap();
        assert!(value.is_none());
        let map: BTreeMap<String, bool> = file.load_or_default().await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_reloads() {
        let path = temp_path("map.json");
        let file = JsonFile::new(&path);
        let mut map = BTreeMap::new();
        map.insert("42".to_string(), true);
        file.save(&map).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"42":true}"#);
        let reloaded: BTreeMap<String, bool> = file.load_or_default().await.unwrap();
        assert_eq!(reloaded, map);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let path = temp_path("bad.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFile::new(&path)
            .load::<BTreeMap<String, bool>>()
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
