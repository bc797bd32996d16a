//! API-Football (api-sports.io) v3 integration.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::source::BaseSource;
use crate::source::Fixture;
use crate::source::FixtureSource;
use crate::source::FixtureStatus;
use crate::source::Score;
use crate::source::SourceInfo;
use crate::source::error::SourceError;

const API_KEY_HEADER: &str = "x-apisports-key";

#[derive(Deserialize)]
struct FixturesResponse {
    #[serde(default)]
    response: Vec<FixtureEntry>,
}

#[derive(Deserialize)]
struct FixtureEntry {
    fixture: FixtureInfo,
    teams: Teams,
    #[serde(default)]
    goals: Goals,
}

#[derive(Deserialize)]
struct FixtureInfo {
    id: i64,
    date: String,
    status: StatusInfo,
}

#[derive(Deserialize)]
struct StatusInfo {
    short: String,
}

#[derive(Deserialize)]
struct Teams {
    home: Team,
    away: Team,
}

#[derive(Deserialize)]
struct Team {
    name: String,
}

#[derive(Deserialize, Default)]
struct Goals {
    home: Option<u32>,
    away: Option<u32>,
}

/// Fetches the next N fixtures plus the last played one for a team.
pub struct ApiFootballSource {
    pub base: BaseSource,
    api_key: String,
    team_id: String,
    season: Option<String>,
    count: u32,
}

impl ApiFootballSource {
    pub fn new(
        api_url: &str,
        api_key: String,
        team_id: &str,
        season: Option<String>,
        count: u32,
        client: Client,
    ) -> Self {
        let info = SourceInfo {
            name: "API-Football".to_string(),
            api_url: api_url.to_string(),
        };
        Self {
            base: BaseSource::new(info, client),
            api_key,
            team_id: team_id.to_string(),
            season,
            count: count.max(1),
        }
    }

    /// Maps the provider's short status code onto [`FixtureStatus`].
    ///
    /// See https://www.api-football.com/documentation-v3#tag/Fixtures/operation/get-fixtures
    pub fn map_status(short: &str) -> FixtureStatus {
        match short {
            "TBD" | "NS" => FixtureStatus::Scheduled,
            "1H" | "HT" | "2H" | "ET" | "BT" | "P" | "SUSP" | "INT" | "LIVE" => {
                FixtureStatus::Live
            }
            "FT" | "AET" | "PEN" | "AWD" | "WO" => FixtureStatus::Finished,
            "PST" => FixtureStatus::Postponed,
            "CANC" | "ABD" => FixtureStatus::Cancelled,
            _ => FixtureStatus::Unknown,
        }
    }

    /// `errors` is an empty array on success and an object keyed by field on failure.
    fn check_resp_errors(resp: &Value) -> Result<(), SourceError> {
        let message = match resp.get("errors") {
            Some(Value::Object(map)) if !map.is_empty() => map
                .values()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            Some(Value::Array(list)) if !list.is_empty() => list
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .collect::<Vec<_>>()
                .join("; "),
            _ => return Ok(()),
        };
        Err(SourceError::ApiError { message })
    }

    pub fn parse_response(body: &str) -> Result<Vec<Fixture>, SourceError> {
        let resp: Value = serde_json::from_str(body)?;
        Self::check_resp_errors(&resp)?;
        let resp: FixturesResponse = serde_json::from_value(resp)?;
        resp.response.into_iter().map(Self::to_fixture).collect()
    }

    fn to_fixture(entry: FixtureEntry) -> Result<Fixture, SourceError> {
        let kickoff = DateTime::parse_from_rfc3339(&entry.fixture.date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| SourceError::InvalidTime {
                time: entry.fixture.date.clone(),
            })?;
        let status = Self::map_status(&entry.fixture.status.short);
        let mut fixture = Fixture::between(
            entry.fixture.id.to_string(),
            entry.teams.home.name,
            entry.teams.away.name,
            kickoff,
        )
        .with_status(status);
        if status == FixtureStatus::Finished
            && let (Some(home), Some(away)) = (entry.goals.home, entry.goals.away)
        {
            fixture.score = Some(Score { home, away });
        }
        Ok(fixture)
    }

    async fn get_fixtures(&self, selector: (&str, String)) -> Result<Vec<Fixture>, SourceError> {
        let mut query = vec![("team", self.team_id.clone()), (selector.0, selector.1)];
        if let Some(season) = &self.season {
            query.push(("season", season.clone()));
        }
        let request = self
            .base
            .client
            .get(self.base.endpoint("/fixtures"))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query);
        let body = self.base.send_get_text(request).await?;
        Self::parse_response(&body)
    }
}

#[async_trait]
impl FixtureSource for ApiFootballSource {
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError> {
        debug!(
            "Fetching fixtures from {} for team {}",
            self.base.info.name, self.team_id
        );
        let mut fixtures = self.get_fixtures(("last", "1".to_string())).await?;
        fixtures.extend(self.get_fixtures(("next", self.count.to_string())).await?);
        Ok(fixtures)
    }

    fn info(&self) -> &SourceInfo {
        &self.base.info
    }
}
