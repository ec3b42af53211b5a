use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CRON: &str = "0 */5 * * * *";
pub const DEFAULT_SHILLER_TTL_HOURS: i64 = 24;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub fred_api_key: String,
    pub alpha_vantage_api_key: Option<String>,
    pub cron: String,
    pub shiller_cache_ttl: chrono::Duration,
    pub http_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fred_api_key: String::new(),
            alpha_vantage_api_key: None,
            cron: DEFAULT_CRON.to_string(),
            shiller_cache_ttl: chrono::Duration::hours(DEFAULT_SHILLER_TTL_HOURS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup. Unset or blank variables
    /// keep their defaults; set but malformed ones are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(key) = get("FRED_API_KEY") {
            config.fred_api_key = key.trim().to_string();
        }
        config.alpha_vantage_api_key = get("ALPHA_VANTAGE_API_KEY").map(|k| k.trim().to_string());

        if let Some(cron) = get("CRASH_MONITOR_CRON") {
            config.cron = cron.trim().to_string();
        }
        if let Some(raw) = get("SHILLER_CACHE_TTL_HOURS") {
            let hours: i64 = parse_positive("SHILLER_CACHE_TTL_HOURS", &raw)?;
            config.shiller_cache_ttl = chrono::Duration::hours(hours);
        }
        if let Some(raw) = get("HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse_positive("HTTP_TIMEOUT_SECS", &raw)?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get("LOG_FORMAT") {
            config.log_format = raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "LOG_FORMAT",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    /// The FRED key, required by every command that fetches.
    pub fn require_fred_key(&self) -> Result<&str, ConfigError> {
        if self.fred_api_key.is_empty() || self.fred_api_key == "demo" {
            return Err(ConfigError::MissingFredKey);
        }
        Ok(&self.fred_api_key)
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(ConfigError::InvalidValue { name, value: raw.to_string() }),
    }
}
