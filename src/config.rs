//! Environment-backed configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;

use crate::error::AppError;

pub const DEFAULT_RSS_URL: &str = "https://www.sofascore.com/team/football/esteghlal/3402/rss";
pub const DEFAULT_API_FOOTBALL_URL: &str = "https://v3.football.api-sports.io";
pub const DEFAULT_FOOTBALL_DATA_URL: &str = "https://api.football-data.org";

/// Which provider fixtures are fetched from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Rss,
    ApiFootball,
    FootballData,
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rss" => Ok(Self::Rss),
            "api-football" | "apifootball" => Ok(Self::ApiFootball),
            "football-data" | "footballdata" => Ok(Self::FootballData),
            other => Err(AppError::InvalidConfig {
                key: "FIXTURE_SOURCE".to_string(),
                reason: format!("unknown source `{other}`"),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub source: SourceKind,
    pub rss_url: String,
    pub api_football_url: String,
    pub api_football_key: Option<String>,
    pub football_data_url: String,
    pub football_data_key: Option<String>,
    pub team_id: String,
    pub team_name: String,
    pub season: Option<String>,
    pub fixture_count: u32,
    pub poll_interval: Duration,
    pub first_run_delay: Duration,
    pub cache_ttl: Duration,
    pub result_window: Duration,
    pub timezone: FixedOffset,
    pub timezone_label: String,
    pub send_rate: u32,
    pub data_path: PathBuf,
    pub logs_path: PathBuf,
    pub dry_run: bool,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dry_run = match get("DRY_RUN") {
            Some(v) => parse_bool("DRY_RUN", &v)?,
            None => false,
        };
        let bot_token = match get("BOT_TOKEN") {
            Some(token) => token,
            None if dry_run => String::new(),
            None => {
                return Err(AppError::MissingConfig {
                    key: "BOT_TOKEN".to_string(),
                });
            }
        };

        let source = get("FIXTURE_SOURCE")
            .map(|v| v.parse::<SourceKind>())
            .transpose()?
            .unwrap_or_default();
        let api_football_key = get("API_FOOTBALL_KEY");
        let football_data_key = get("FOOTBALL_DATA_KEY");
        match source {
            SourceKind::ApiFootball if api_football_key.is_none() => {
                return Err(AppError::MissingConfig {
                    key: "API_FOOTBALL_KEY".to_string(),
                });
            }
            SourceKind::FootballData if football_data_key.is_none() => {
                return Err(AppError::MissingConfig {
                    key: "FOOTBALL_DATA_KEY".to_string(),
                });
            }
            _ => {}
        }

        let timezone = match get("TIMEZONE_OFFSET") {
            Some(v) => parse_offset(&v).ok_or_else(|| AppError::InvalidConfig {
                key: "TIMEZONE_OFFSET".to_string(),
                reason: format!("`{v}` is not an offset like +03:30"),
            })?,
            None => FixedOffset::east_opt(3 * 3600 + 30 * 60).ok_or_else(|| {
                AppError::ConfigurationError {
                    msg: "default timezone offset out of range".to_string(),
                }
            })?,
        };

        let poll_interval = Duration::from_secs(parse_num(&get, "POLL_INTERVAL", 1800)?);
        if poll_interval.is_zero() {
            return Err(AppError::InvalidConfig {
                key: "POLL_INTERVAL".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(Self {
            bot_token,
            source,
            rss_url: get("RSS_URL").unwrap_or_else(|| DEFAULT_RSS_URL.to_string()),
            api_football_url: get("API_FOOTBALL_URL")
                .unwrap_or_else(|| DEFAULT_API_FOOTBALL_URL.to_string()),
            api_football_key,
            football_data_url: get("FOOTBALL_DATA_URL")
                .unwrap_or_else(|| DEFAULT_FOOTBALL_DATA_URL.to_string()),
            football_data_key,
            team_id: get("TEAM_ID").unwrap_or_else(|| "3402".to_string()),
            team_name: get("TEAM_NAME").unwrap_or_else(|| "Esteghlal".to_string()),
            season: get("SEASON"),
            fixture_count: parse_num(&get, "FIXTURE_COUNT", 5)?,
            poll_interval,
            first_run_delay: Duration::from_secs(parse_num(&get, "FIRST_RUN_DELAY", 10)?),
            cache_ttl: Duration::from_secs(parse_num(&get, "CACHE_TTL", 1800)?),
            result_window: Duration::from_secs(parse_num(&get, "RESULT_WINDOW", 43200)?),
            timezone,
            timezone_label: get("TIMEZONE_LABEL").unwrap_or_else(|| "Iran".to_string()),
            send_rate: parse_num(&get, "SEND_RATE", 25)?,
            data_path: PathBuf::from(get("DATA_PATH").unwrap_or_else(|| "data".to_string())),
            logs_path: PathBuf::from(get("LOGS_PATH").unwrap_or_else(|| "logs".to_string())),
            dry_run,
        })
    }
}

fn parse_num<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v.trim().parse::<T>().map_err(|e| AppError::InvalidConfig {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::InvalidConfig {
            key: key.to_string(),
            reason: format!("`{other}` is not a boolean"),
        }),
    }
}

/// Parses offsets of the form `+03:30`, `-05:00` or `+0330`.
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.chars().next()? {
        '+' => (1, &value[1..]),
        '-' => (-1, &value[1..]),
        _ => (1, value),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
