//! Relay configuration from environment variables
//!
//! | variable | default |
//! |---|---|
//! | `DISCORD_TOKEN` | required for the discord sink |
//! | `DISCORD_CHANNEL_ID` | required for the discord sink |
//! | `DISCORD_API_BASE` | `https://discord.com/api/v10` |
//! | `RELAY_SINK` | `discord` (`stdout` for a dry run) |
//! | `GRPC_ADDRESS` | `localhost:50051` |
//! | `MIN_MAGNITUDE` | `5.0` |
//! | `ALERT_LEVEL` | `ORANGE` |
//! | `DISASTER_TYPE` | unset (all categories) |
//! | `MAX_RETRIES` | `5` |
//! | `RETRY_BACKOFF_SECS` | `5` |
//! | `BACKFILL_LIMIT` | `50` (0 disables, max 50) |
//! | `METRICS_ADDR` | `0.0.0.0:9090` (`off` disables) |
//! | `LOG_LEVEL` | `info` |
//! | `LOG_FORMAT` | `pretty` (or `json`) |
//!
//! Empty values count as unset. Anything else that fails to parse is an
//! error; the relay refuses to start on a bad config.

use crate::engine::{EngineConfig, MAX_BACKFILL_LIMIT};
use crate::error::{RelayError, Result};
use crate::feed::FeedFilter;
use crate::filter::{DEFAULT_MIN_ALERT_LEVEL, DEFAULT_MIN_MAGNITUDE, FilterPolicy};
use crate::retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF};
use crate::sink::discord::DEFAULT_API_BASE;
use disaster_relay_core::{AlertLevel, Category};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream address
pub const DEFAULT_GRPC_ADDRESS: &str = "localhost:50051";

/// Default metrics/health listen address
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:9090";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(RelayError::Config(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Discord credentials
#[derive(Clone, PartialEq, Eq)]
pub struct DiscordSettings {
    pub token: String,
    pub channel_id: String,
    pub api_base: String,
}

impl fmt::Debug for DiscordSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordSettings")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Which sink receives alerts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkSettings {
    Discord(DiscordSettings),
    Stdout,
}

impl SinkSettings {
    /// Sink name, as used in metrics labels
    pub fn name(&self) -> &'static str {
        match self {
            SinkSettings::Discord(_) => "discord",
            SinkSettings::Stdout => "stdout",
        }
    }
}

/// Complete relay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sink: SinkSettings,
    pub grpc_address: String,
    pub engine: EngineConfig,
    /// `None` when the metrics server is disabled
    pub metrics_addr: Option<SocketAddr>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Read configuration from the process environment
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`
    #[allow(clippy::result_large_err)]
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sink = match get("RELAY_SINK").as_deref().map(str::to_ascii_lowercase) {
            None => discord_settings(&get)?,
            Some(kind) if kind == "discord" => discord_settings(&get)?,
            Some(kind) if kind == "stdout" => SinkSettings::Stdout,
            Some(other) => {
                return Err(RelayError::Config(format!(
                    "RELAY_SINK must be 'discord' or 'stdout', got '{other}'"
                )));
            }
        };

        let min_magnitude = parse_or(&get, "MIN_MAGNITUDE", DEFAULT_MIN_MAGNITUDE)?;
        if !min_magnitude.is_finite() {
            return Err(RelayError::Config(format!(
                "MIN_MAGNITUDE must be a finite number, got {min_magnitude}"
            )));
        }
        let min_alert_level: AlertLevel = parse_or(&get, "ALERT_LEVEL", DEFAULT_MIN_ALERT_LEVEL)?;
        let category: Option<Category> = parse_opt(&get, "DISASTER_TYPE")?;

        let max_retries: u32 = parse_or(&get, "MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(RelayError::Config("MAX_RETRIES must be at least 1".into()));
        }

        let backoff_secs: u64 = parse_or(&get, "RETRY_BACKOFF_SECS", DEFAULT_RETRY_BACKOFF.as_secs())?;

        let backfill_limit: usize = parse_or(&get, "BACKFILL_LIMIT", MAX_BACKFILL_LIMIT)?;
        if backfill_limit > MAX_BACKFILL_LIMIT {
            return Err(RelayError::Config(format!(
                "BACKFILL_LIMIT must be at most {MAX_BACKFILL_LIMIT}, got {backfill_limit}"
            )));
        }

        let metrics_addr = match get("METRICS_ADDR") {
            Some(v) if v.eq_ignore_ascii_case("off") => None,
            Some(v) => Some(parse_value::<SocketAddr>("METRICS_ADDR", &v)?),
            None => Some(parse_value::<SocketAddr>("METRICS_ADDR", DEFAULT_METRICS_ADDR)?),
        };

        Ok(Config {
            sink,
            grpc_address: get("GRPC_ADDRESS").unwrap_or_else(|| DEFAULT_GRPC_ADDRESS.to_string()),
            engine: EngineConfig {
                policy: FilterPolicy::new(min_magnitude, min_alert_level),
                max_retries,
                retry_backoff: Duration::from_secs(backoff_secs),
                backfill_limit,
                feed_filter: FeedFilter { category },
            },
            metrics_addr,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: parse_or(&get, "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

#[allow(clippy::result_large_err)]
fn discord_settings(get: &impl Fn(&str) -> Option<String>) -> Result<SinkSettings> {
    let token = get("DISCORD_TOKEN")
        .ok_or_else(|| RelayError::Config("DISCORD_TOKEN is required for the discord sink".into()))?;
    let channel_id = get("DISCORD_CHANNEL_ID").ok_or_else(|| {
        RelayError::Config("DISCORD_CHANNEL_ID is required for the discord sink".into())
    })?;
    Ok(SinkSettings::Discord(DiscordSettings {
        token,
        channel_id,
        api_base: get("DISCORD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
    }))
}

#[allow(clippy::result_large_err)]
fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| RelayError::Config(format!("invalid {key} '{raw}': {e}")))
}

#[allow(clippy::result_large_err)]
fn parse_opt<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    get(key).map(|raw| parse_value(key, &raw)).transpose()
}

#[allow(clippy::result_large_err)]
fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}
