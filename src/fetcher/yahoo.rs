use super::DataSource;
use crate::models::RawObservation;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::DateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Daily closes over the last month, oldest first.
pub struct YahooFetcher {
    interval: &'static str,
    range: &'static str,
}

impl YahooFetcher {
    pub fn new() -> Self {
        YahooFetcher { interval: "1d", range: "1mo" }
    }

    /// A quote worth keeping: known timestamp and a real, non-zero close.
    /// Yahoo pads holidays and the current session with zeros or NaN.
    pub fn raw_from_close(timestamp: i64, close: f64) -> Option<RawObservation> {
        if !close.is_finite() || close == 0.0 {
            return None;
        }
        let date = DateTime::from_timestamp(timestamp, 0)?.date_naive();
        Some(RawObservation::number(date.format("%Y-%m-%d").to_string(), close))
    }
}

impl Default for YahooFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for YahooFetcher {
    fn name(&self) -> &str {
        "Yahoo"
    }

    async fn fetch_raw(&self, symbol: &str) -> Result<Vec<RawObservation>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| anyhow!("Failed to init Yahoo Connector: {}", e))?;

        let resp = provider
            .get_quote_range(symbol, self.interval, self.range)
            .await
            .map_err(|e| anyhow!("Yahoo API Error: {}", e))?;

        let quotes = resp
            .quotes()
            .map_err(|e| anyhow!("Failed to parse Yahoo quotes: {}", e))?;

        let total = quotes.len();
        let data_points: Vec<RawObservation> = quotes
            .iter()
            .filter_map(|quote| Self::raw_from_close(quote.timestamp as i64, quote.close))
            .collect();

        if data_points.is_empty() {
            return Err(anyhow!("No data returned for symbol: {}", symbol));
        }

        debug!(symbol, kept = data_points.len(), total, "Yahoo closes received");
        Ok(data_points)
    }
}
