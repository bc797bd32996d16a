//! football-data.org v4 integration.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
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

const API_KEY_HEADER: &str = "X-Auth-Token";
const LOOKBACK_DAYS: i64 = 3;
const LOOKAHEAD_DAYS: i64 = 30;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Match {
    id: i64,
    utc_date: String,
    status: String,
    home_team: Team,
    away_team: Team,
    #[serde(default)]
    score: Option<MatchScore>,
}

#[derive(Deserialize)]
struct Team {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchScore {
    full_time: Option<Goals>,
}

#[derive(Deserialize)]
struct Goals {
    home: Option<u32>,
    away: Option<u32>,
}

/// Fetches a team's matches in a window around today.
pub struct FootballDataSource {
    pub base: BaseSource,
    api_key: String,
    team_id: String,
    season: Option<String>,
    count: usize,
}

impl FootballDataSource {
    pub fn new(
        api_url: &str,
        api_key: String,
        team_id: &str,
        season: Option<String>,
        count: u32,
        client: Client,
    ) -> Self {
        let info = SourceInfo {
            name: "football-data.org".to_string(),
            api_url: api_url.to_string(),
        };
        Self {
            base: BaseSource::new(info, client),
            api_key,
            team_id: team_id.to_string(),
            season,
            count: count.max(1) as usize,
        }
    }

    pub fn map_status(status: &str) -> FixtureStatus {
        match status {
            "SCHEDULED" | "TIMED" => FixtureStatus::Scheduled,
            "IN_PLAY" | "PAUSED" | "SUSPENDED" => FixtureStatus::Live,
            "FINISHED" | "AWARDED" => FixtureStatus::Finished,
            "POSTPONED" => FixtureStatus::Postponed,
            "CANCELLED" => FixtureStatus::Cancelled,
            _ => FixtureStatus::Unknown,
        }
    }

    /// Error bodies look like `{"message": "...", "errorCode": 400}`.
    fn check_resp_errors(resp: &Value) -> Result<(), SourceError> {
        if resp.get("errorCode").is_some() || resp.get("matches").is_none() {
            let message = resp
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown API error")
                .to_string();
            return Err(SourceError::ApiError { message });
        }
        Ok(())
    }

    /// Parses the response, keeping the most recent finished match and at most
    /// `count` upcoming ones.
    pub fn parse_response(body: &str, count: usize) -> Result<Vec<Fixture>, SourceError> {
        let resp: Value = serde_json::from_str(body)?;
        Self::check_resp_errors(&resp)?;
        let resp: MatchesResponse = serde_json::from_value(resp)?;

        let mut fixtures = resp
            .matches
            .into_iter()
            .map(Self::to_fixture)
            .collect::<Result<Vec<_>, _>>()?;
        fixtures.sort_by_key(|f| f.kickoff);

        let last_finished = fixtures
            .iter()
            .rposition(|f| f.status == FixtureStatus::Finished);
        let mut ret: Vec<Fixture> = Vec::new();
        if let Some(idx) = last_finished {
            ret.push(fixtures[idx].clone());
        }
        ret.extend(
            fixtures
                .into_iter()
                .filter(|f| f.status != FixtureStatus::Finished)
                .take(count),
        );
        Ok(ret)
    }

    fn to_fixture(m: Match) -> Result<Fixture, SourceError> {
        let kickoff = DateTime::parse_from_rfc3339(&m.utc_date)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| SourceError::InvalidTime {
                time: m.utc_date.clone(),
            })?;
        let status = Self::map_status(&m.status);
        let home = m.home_team.name.unwrap_or_else(|| "TBD".to_string());
        let away = m.away_team.name.unwrap_or_else(|| "TBD".to_string());
        let mut fixture = Fixture::between(m.id.to_string(), home, away, kickoff).with_status(status);
        if status == FixtureStatus::Finished
            && let Some(Goals {
                home: Some(home),
                away: Some(away),
            }) = m.score.and_then(|s| s.full_time)
        {
            fixture.score = Some(Score { home, away });
        }
        Ok(fixture)
    }
}

#[async_trait]
impl FixtureSource for FootballDataSource {
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError> {
        debug!(
            "Fetching fixtures from {} for team {}",
            self.base.info.name, self.team_id
        );
        let today = Utc::now().date_naive();
        let mut query = vec![
            (
                "dateFrom",
                (today - Duration::days(LOOKBACK_DAYS)).format("%Y-%m-%d").to_string(),
            ),
            (
                "dateTo",
                (today + Duration::days(LOOKAHEAD_DAYS)).format("%Y-%m-%d").to_string(),
            ),
        ];
        if let Some(season) = &self.season {
            query.push(("season", season.clone()));
        }
        let request = self
            .base
            .client
            .get(self.base.endpoint(&format!("/v4/teams/{}/matches", self.team_id)))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query);
        let body = self.base.send_get_text(request).await?;
        Self::parse_response(&body, self.count)
    }

    fn info(&self) -> &SourceInfo {
        &self.base.info
    }
}
