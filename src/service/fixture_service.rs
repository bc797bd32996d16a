//! Fixture lookups for commands.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::service::error::ServiceError;
use crate::source::Fixture;
use crate::source::FixtureSource;

pub struct FixtureService {
    source: Arc<dyn FixtureSource>,
}

impl FixtureService {
    pub fn new(source: Arc<dyn FixtureSource>) -> Self {
        Self { source }
    }

    /// The first `n` fixtures still to be played at `now`, by kickoff.
    pub async fn upcoming(
        &self,
        now: DateTime<Utc>,
        n: usize,
    ) -> Result<Vec<Fixture>, ServiceError> {
        let fixtures = self.source.fetch_fixtures().await?;
        Ok(Self::select_upcoming(fixtures, now, n))
    }

    pub async fn next_fixture(&self, now: DateTime<Utc>) -> Result<Option<Fixture>, ServiceError> {
        Ok(self.upcoming(now, 1).await?.into_iter().next())
    }

    fn select_upcoming(mut fixtures: Vec<Fixture>, now: DateTime<Utc>, n: usize) -> Vec<Fixture> {
        fixtures.retain(|f| f.kickoff >= now && f.is_pending());
        fixtures.sort_by_key(|f| f.kickoff);
        fixtures.truncate(n);
        fixtures
    }
}
