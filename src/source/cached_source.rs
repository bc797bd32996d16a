//! Time-windowed memo in front of a fixture source.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::source::Fixture;
use crate::source::FixtureSource;
use crate::source::SourceInfo;
use crate::source::error::SourceError;
use crate::store::JsonFile;

pub const CACHE_FILE: &str = "fixtures_cache.json";

/// Last fetched fixture list and when it was fetched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub fixtures: Vec<Fixture>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        let age = now - self.timestamp;
        age >= TimeDelta::zero() && age < ttl
    }
}

/// Serves fixtures from memory until `ttl` has passed since the last fetch.
///
/// When a file is given the entry is also persisted, so a restart inside the
/// window does not hit the provider again.
pub struct CachedSource<S> {
    inner: S,
    ttl: TimeDelta,
    file: Option<JsonFile>,
    entry: Mutex<Option<CacheEntry>>,
}

impl<S: FixtureSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration, path: Option<PathBuf>) -> Self {
        Self {
            inner,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            file: path.map(JsonFile::new),
            entry: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn load_persisted(&self) -> Option<CacheEntry> {
        let file = self.file.as_ref()?;
        match file.load::<CacheEntry>().await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable fixture cache: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl<S: FixtureSource> FixtureSource for CachedSource<S> {
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError> {
        let mut entry = self.entry.lock().await;
        if entry.is_none() {
            *entry = self.load_persisted().await;
        }

        let now = Utc::now();
        if let Some(cached) = entry.as_ref()
            && cached.is_fresh(now, self.ttl)
        {
            debug!(
                "Serving {} fixtures from cache (fetched at {}).",
                cached.fixtures.len(),
                cached.timestamp
            );
            return Ok(cached.fixtures.clone());
        }

        let fixtures = self.inner.fetch_fixtures().await?;
        let fresh = CacheEntry {
            timestamp: now,
            fixtures: fixtures.clone(),
        };
        if let Some(file) = &self.file
            && let Err(e) = file.save(&fresh).await
        {
            warn!("Failed to persist fixture cache: {e}");
        }
        *entry = Some(fresh);
        Ok(fixtures)
    }

    fn info(&self) -> &SourceInfo {
        self.inner.info()
    }
}
