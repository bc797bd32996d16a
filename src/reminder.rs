//! Reminder kinds and the windows that make them due.

use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;

use crate::source::Fixture;
use crate::source::FixtureStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    DayBefore,
    HourBefore,
    Result,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayBefore => "24h",
            Self::HourBefore => "1h",
            Self::Result => "result",
        }
    }

    /// Dedup key for this reminder of `fixture_id`, e.g. `1234_24h`.
    pub fn key(&self, fixture_id: &str) -> String {
        format!("{fixture_id}_{}", self.as_str())
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open interval `(start, end)` of time-to-kickoff.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    pub start: TimeDelta,
    pub end: TimeDelta,
}

impl Window {
    pub fn contains(&self, diff: TimeDelta) -> bool {
        self.start < diff && diff < self.end
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReminderWindows {
    pub day_before: Window,
    pub hour_before: Window,
    /// How long after kickoff a finished fixture may still be announced.
    pub result_lookback: TimeDelta,
}

impl ReminderWindows {
    pub fn new(result_lookback: Duration) -> Self {
        Self {
            result_lookback: TimeDelta::from_std(result_lookback).unwrap_or(TimeDelta::MAX),
            ..Self::default()
        }
    }

    /// Reminder kinds due for `fixture` at `now`, in send order.
    pub fn due(&self, fixture: &Fixture, now: DateTime<Utc>) -> Vec<ReminderKind> {
        let diff = fixture.kickoff - now;
        let mut due = Vec::new();
        let schedulable = matches!(
            fixture.status,
            FixtureStatus::Scheduled | FixtureStatus::Unknown
        );

        if schedulable && self.day_before.contains(diff) {
            due.push(ReminderKind::DayBefore);
        }
        if schedulable && self.hour_before.contains(diff) {
            due.push(ReminderKind::HourBefore);
        }
        if fixture.status == FixtureStatus::Finished && -diff <= self.result_lookback {
            due.push(ReminderKind::Result);
        }
        due
    }
}

impl Default for ReminderWindows {
    fn default() -> Self {
        Self {
            day_before: Window {
                start: TimeDelta::hours(23) + TimeDelta::minutes(30),
                end: TimeDelta::hours(24) + TimeDelta::minutes(30),
            },
            hour_before: Window {
                start: TimeDelta::minutes(50),
                end: TimeDelta::minutes(70),
            },
            result_lookback: TimeDelta::hours(12),
        }
    }
}
