//! Fixture sources: RSS feeds and REST football APIs.

pub mod api_football_source;
pub mod cached_source;
pub mod error;
pub mod football_data_source;
pub mod rss_source;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;
use crate::config::SourceKind;
use crate::source::api_football_source::ApiFootballSource;
use crate::source::cached_source::CachedSource;
use crate::source::error::SourceError;
use crate::source::football_data_source::FootballDataSource;
use crate::source::rss_source::RssSource;

/// Lifecycle state of a fixture as reported by the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
    Postponed,
    Cancelled,
    Unknown,
}

/// Full-time score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// A scheduled or completed match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Provider identifier, stable across polls.
    pub id: String,
    /// "Home vs Away", or the raw entry title for feeds.
    pub title: String,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
    pub kickoff: DateTime<Utc>,
    #[serde(default)]
    pub status: FixtureStatus,
    #[serde(default)]
    pub score: Option<Score>,
}

impl Fixture {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kickoff: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            home: None,
            away: None,
            kickoff,
            status: FixtureStatus::Scheduled,
            score: None,
        }
    }

    /// Creates a fixture titled "`home` vs `away`".
    pub fn between(
        id: impl Into<String>,
        home: impl Into<String>,
        away: impl Into<String>,
        kickoff: DateTime<Utc>,
    ) -> Self {
        let home = home.into();
        let away = away.into();
        Self {
            id: id.into(),
            title: format!("{home} vs {away}"),
            home: Some(home),
            away: Some(away),
            kickoff,
            status: FixtureStatus::Scheduled,
            score: None,
        }
    }

    pub fn with_status(mut self, status: FixtureStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_score(mut self, home: u32, away: u32) -> Self {
        self.score = Some(Score { home, away });
        self
    }

    /// Whether the fixture can still be played at or after its kickoff.
    pub fn is_pending(&self) -> bool {
        !matches!(
            self.status,
            FixtureStatus::Finished | FixtureStatus::Cancelled
        )
    }
}

/// Static description of a fixture provider.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    /// e.g. "API-Football", "football-data.org"
    pub name: String,
    /// Base url requests are made against, e.g. https://v3.football.api-sports.io
    pub api_url: String,
}

/// Shared state for HTTP-backed sources.
#[derive(Clone)]
pub struct BaseSource {
    pub info: SourceInfo,
    pub client: Client,
}

impl BaseSource {
    pub fn new(info: SourceInfo, client: Client) -> Self {
        Self { info, client }
    }

    /// Client with the bot's user agent set.
    pub fn default_client() -> Result<Client, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("kickoff-bot/", env!("CARGO_PKG_VERSION"))),
        );
        Ok(Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(20))
            .build()?)
    }

    /// Joins a path onto the base url without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.info.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends the request and returns the body, mapping non-success statuses to errors.
    pub async fn send_get_text(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, SourceError> {
        let req = request.build()?;
        log::debug!("Making request to: {}", req.url());
        let response = self.client.execute(req).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(body)
    }
}

/// A provider of fixtures for one fixed team.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Fetches the current set of fixtures: upcoming ones and, where the
    /// provider supports it, the most recent finished one.
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError>;

    fn info(&self) -> &SourceInfo;
}

/// Builds the configured source. REST sources are put behind a cache.
pub fn create_source(config: &Config) -> Result<Arc<dyn FixtureSource>, SourceError> {
    let client = BaseSource::default_client()?;
    let source: Arc<dyn FixtureSource> = match config.source {
        SourceKind::Rss => Arc::new(RssSource::new(&config.rss_url, client)),
        SourceKind::ApiFootball => {
            let key = config
                .api_football_key
                .clone()
                .ok_or(SourceError::MissingApiKey {
                    source_name: "API-Football".to_string(),
                })?;
            let inner = ApiFootballSource::new(
                &config.api_football_url,
                key,
                &config.team_id,
                config.season.clone(),
                config.fixture_count,
                client,
            );
            Arc::new(CachedSource::new(
                inner,
                config.cache_ttl,
                Some(config.data_path.join(cached_source::CACHE_FILE)),
            ))
        }
        SourceKind::FootballData => {
            let key = config
                .football_data_key
                .clone()
                .ok_or(SourceError::MissingApiKey {
                    source_name: "football-data.org".to_string(),
                })?;
            let inner = FootballDataSource::new(
                &config.football_data_url,
                key,
                &config.team_id,
                config.season.clone(),
                config.fixture_count,
                client,
            );
            Arc::new(CachedSource::new(
                inner,
                config.cache_ttl,
                Some(config.data_path.join(cached_source::CACHE_FILE)),
            ))
        }
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_between_builds_title() {
        let kickoff = Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap();
        let fixture = Fixture::between("42", "Esteghlal", "Persepolis", kickoff);
        assert_eq!(fixture.title, "Esteghlal vs Persepolis");
        assert_eq!(fixture.home.as_deref(), Some("Esteghlal"));
        assert!(fixture.is_pending());
        assert!(!fixture.with_status(FixtureStatus::Finished).is_pending());
    }

    #[test]
    fn test_endpoint_join() {
        let base = BaseSource::new(
            SourceInfo {
                name: "Test".to_string(),
                api_url: "http://localhost:1234/".to_string(),
            },
            Client::new(),
        );
        assert_eq!(base.endpoint("/fixtures"), "http://localhost:1234/fixtures");
        assert_eq!(base.endpoint("v4/teams"), "http://localhost:1234/v4/teams");
    }

    #[test]
    fn test_fixture_json_defaults() {
        let fixture: Fixture = serde_json::from_str(
            r#"{"id":"1","title":"A vs B","kickoff":"2025-03-01T15:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(fixture.status, FixtureStatus::Scheduled);
        assert!(fixture.score.is_none());
    }
}
