//! RSS team feed source.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use log::debug;
use log::warn;
use reqwest::Client;
use serde::Deserialize;

use crate::source::BaseSource;
use crate::source::Fixture;
use crate::source::FixtureSource;
use crate::source::SourceInfo;
use crate::source::error::SourceError;

#[derive(Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    title: Option<String>,
    guid: Option<Text>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Reads fixtures from a team RSS feed, one fixture per `<item>`.
///
/// Feeds carry no status or score, so every entry is reported as scheduled.
pub struct RssSource {
    pub base: BaseSource,
}

impl RssSource {
    pub fn new(url: &str, client: Client) -> Self {
        let info = SourceInfo {
            name: "RSS".to_string(),
            api_url: url.to_string(),
        };
        Self {
            base: BaseSource::new(info, client),
        }
    }

    /// Parses a feed body. Entries without a usable date are skipped.
    pub fn parse_feed(body: &str) -> Result<Vec<Fixture>, SourceError> {
        let rss: Rss = quick_xml::de::from_str(body)?;
        let fixtures = rss
            .channel
            .items
            .into_iter()
            .filter_map(|item| match Self::parse_item(item) {
                Ok(fixture) => Some(fixture),
                Err(e) => {
                    warn!("Skipping feed entry: {e}");
                    None
                }
            })
            .collect();
        Ok(fixtures)
    }

    fn parse_item(item: Item) -> Result<Fixture, SourceError> {
        let title = item
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SourceError::MissingField {
                field: "item.title".to_string(),
            })?;
        let pub_date = item.pub_date.ok_or_else(|| SourceError::MissingField {
            field: "item.pubDate".to_string(),
        })?;
        let kickoff = Self::parse_date(&pub_date)?;

        let id = item
            .guid
            .map(|g| g.value.trim().to_string())
            .filter(|g| !g.is_empty())
            .or_else(|| item.link.map(|l| l.trim().to_string()))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("{}@{}", title, kickoff.timestamp()));

        Ok(Fixture::new(id, title, kickoff))
    }

    fn parse_date(value: &str) -> Result<DateTime<Utc>, SourceError> {
        let value = value.trim();
        DateTime::parse_from_rfc2822(value)
            .or_else(|_| DateTime::parse_from_rfc3339(value))
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| SourceError::InvalidTime {
                time: value.to_string(),
            })
    }
}

#[async_trait]
impl FixtureSource for RssSource {
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError> {
        debug!("Fetching fixtures from {}", self.base.info.api_url);
        let request = self.base.client.get(&self.base.info.api_url);
        let body = self.base.send_get_text(request).await?;
        Self::parse_feed(&body)
    }

    fn info(&self) -> &SourceInfo {
        &self.base.info
    }
}
