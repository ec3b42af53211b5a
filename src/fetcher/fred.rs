use async_trait::async_trait;
use super::DataSource;
use crate::core::clock::{Clock, SystemClock};
use crate::core::rate_limiter::Backoff;
use crate::indicators::registry::{Lookback, Registry, SourceType};
use crate::models::RawObservation;
use anyhow::{Result, anyhow};
use chrono::{Months, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

pub struct FredFetcher {
    api_key: String,
    client: Client,
    backoff: Backoff,
    clock: Arc<dyn Clock>,
}

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

impl FredFetcher {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("CrashMonitor/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            backoff: Backoff::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Trims whitespace and lowercases; FRED keys are 32 lowercase hex chars.
    fn sanitized_key(&self) -> Result<String> {
        let key = self.api_key.trim().to_lowercase();

        if key.is_empty() {
            return Err(anyhow!("FRED API Key is empty or missing!"));
        }
        if key.len() != 32 {
            // never log the key itself
            warn!(key_len = key.len(), "FRED API key is not 32 characters, requests will likely fail");
        }
        Ok(key)
    }

    /// Observations URL for `series_id`, newest first, windowed by the
    /// registry's lookback and ending `today`.
    pub fn request_url(api_key: &str, series_id: &str, today: NaiveDate) -> String {
        let meta = Registry::get_by_source(SourceType::Fred)
            .into_iter()
            .find(|m| m.source_symbol == Some(series_id));

        let mut url = format!(
            "{}?series_id={}&api_key={}&file_type=json&sort_order=desc&observation_end={}",
            BASE_URL,
            series_id,
            api_key,
            today.format("%Y-%m-%d")
        );

        let Some(meta) = meta else {
            return url;
        };

        let start = match meta.lookback {
            Lookback::Since(date) => date.to_string(),
            Lookback::MonthsBack(months) => today
                .checked_sub_months(Months::new(months))
                .unwrap_or(today)
                .format("%Y-%m-%d")
                .to_string(),
        };
        url.push_str(&format!("&observation_start={}", start));

        if let Some(freq) = meta.frequency {
            url.push_str(&format!("&frequency={}", freq));
        }
        url
    }

    /// Pulls `observations` out of a FRED response. Values are kept as the
    /// raw strings, including FRED's "." for missing data.
    pub fn parse_observations(json: &Value) -> Result<Vec<RawObservation>> {
        let observations = json["observations"]
            .as_array()
            .ok_or_else(|| anyhow!("No observations found in FRED response"))?;

        Ok(observations
            .iter()
            .filter_map(|obs| {
                // "date": "2023-01-01", "value": "123.45"
                match (obs["date"].as_str(), obs["value"].as_str()) {
                    (Some(date), Some(value)) => Some(RawObservation::text(date, value)),
                    _ => None,
                }
            })
            .collect())
    }
}

#[async_trait]
impl DataSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch_raw(&self, series_id: &str) -> Result<Vec<RawObservation>> {
        let key = self.sanitized_key()?;
        let url = Self::request_url(&key, series_id, self.clock.now().date_naive());

        let mut attempt = 0;
        let resp = loop {
            // reqwest errors carry the URL, which holds the key
            let resp = self.client.get(&url).send().await.map_err(|e| anyhow!(e.without_url()))?;
            let status = resp.status();

            if status.is_success() {
                break resp;
            }
            if Backoff::is_retryable(status) && attempt < self.backoff.max_retries {
                info!(series = series_id, %status, attempt, "FRED request throttled, retrying");
                self.backoff.wait(attempt).await;
                attempt += 1;
                continue;
            }

            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("FRED API Error: {} - Body: {}", status, error_text));
        };

        let json: Value = resp.json().await.map_err(|e| anyhow!(e.without_url()))?;
        let observations = Self::parse_observations(&json)?;
        debug!(series = series_id, count = observations.len(), "FRED observations received");
        Ok(observations)
    }
}
