use super::ScalarSource;
use crate::core::cache::TtlCache;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MULTPL_URL: &str = "https://www.multpl.com/shiller-pe";
const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query?function=OVERVIEW&symbol=SPY";
pub const CACHE_KEY: &str = "shiller_pe";

/// Plausible CAPE range; anything outside is a parse accident.
fn plausible(value: f64) -> bool {
    value > 5.0 && value < 100.0
}

/// Current Shiller P/E, scraped from multpl.com with an Alpha Vantage
/// P/E fallback. Results are memoized in a TTL cache.
pub struct ShillerPeFetcher {
    client: Client,
    alpha_vantage_key: Option<String>,
    cache: Arc<TtlCache>,
}

impl ShillerPeFetcher {
    pub fn new(cache: Arc<TtlCache>, alpha_vantage_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
                .timeout(timeout)
                .cookie_store(true)
                .build()
                .unwrap_or_else(|_| Client::new()),
            alpha_vantage_key: alpha_vantage_key.filter(|k| !k.trim().is_empty()),
            cache,
        }
    }

    async fn fetch_multpl(&self) -> Result<f64> {
        let resp = self
            .client
            .get(MULTPL_URL)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!("Multpl Error: {}", resp.status()));
        }

        let body = resp.text().await?;
        parse_shiller_pe(&body).ok_or_else(|| anyhow!("No Shiller PE found parsing multpl.com"))
    }

    async fn fetch_alpha_vantage(&self, key: &str) -> Result<f64> {
        let url = format!("{}&apikey={}", ALPHA_VANTAGE_URL, key.trim());
        let resp = self.client.get(&url).send().await.map_err(|e| anyhow!(e.without_url()))?;

        if !resp.status().is_success() {
            return Err(anyhow!("Alpha Vantage Error: {}", resp.status()));
        }

        let json: Value = resp.json().await.map_err(|e| anyhow!(e.without_url()))?;
        parse_alpha_vantage_pe(&json).ok_or_else(|| anyhow!("Alpha Vantage response has no usable PERatio"))
    }
}

#[async_trait]
impl ScalarSource for ShillerPeFetcher {
    fn name(&self) -> &str {
        "multpl"
    }

    /// Cached value, else multpl.com, else Alpha Vantage, else `None`.
    async fn fetch_current(&self) -> Option<f64> {
        if let Some(value) = self.cache.get_fresh(CACHE_KEY) {
            return Some(value);
        }

        match self.fetch_multpl().await {
            Ok(value) => {
                info!(value, source = "multpl.com", "Current Shiller PE");
                self.cache.insert(CACHE_KEY, value);
                return Some(value);
            }
            Err(e) => warn!(error = %e, "multpl.com failed"),
        }

        if let Some(key) = &self.alpha_vantage_key {
            match self.fetch_alpha_vantage(key).await {
                Ok(value) => {
                    // SPY trailing P/E, a proxy for CAPE
                    info!(value, source = "alphavantage", "Current PE ratio used as Shiller PE proxy");
                    self.cache.insert(CACHE_KEY, value);
                    return Some(value);
                }
                Err(e) => warn!(error = %e, "Alpha Vantage failed"),
            }
        }

        warn!("Could not fetch current Shiller PE from any source, scoring continues without it");
        None
    }
}

/// Extracts the current CAPE from the multpl.com page.
///
/// Tries the `#current` element, then a "Shiller PE Ratio: N" phrase in the
/// page text, then the first CAPE-shaped number (20.0 - 50.99) on the page.
pub fn parse_shiller_pe(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);

    let from_current = Selector::parse("#current").ok().and_then(|selector| {
        document.select(&selector).next().and_then(|el| {
            let text = el.text().collect::<Vec<_>>().join(" ");
            number_after(&text, "ratio:").or_else(|| numeric_words(&text).find(|v| plausible(*v)))
        })
    });
    if let Some(value) = from_current.filter(|v| plausible(*v)) {
        return Some(value);
    }

    let nodes: Vec<&str> = document.root_element().text().collect();
    if let Some(value) = number_after(&nodes.join(" "), "shiller pe ratio:").filter(|v| plausible(*v)) {
        return Some(value);
    }

    // one node at a time so adjacent cells never merge into one token
    nodes
        .iter()
        .flat_map(|node| node.split(|c: char| !(c.is_alphanumeric() || c == '.' || c == '_')))
        .find(|word| cape_shaped(word))
        .and_then(|word| word.parse::<f64>().ok())
        .filter(|v| plausible(*v))
}

/// `PERatio` from an Alpha Vantage OVERVIEW response, if positive.
pub fn parse_alpha_vantage_pe(json: &Value) -> Option<f64> {
    let value = match &json["PERatio"] {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

/// First number following `marker` (case-insensitive), skipping whitespace.
fn number_after(text: &str, marker: &str) -> Option<f64> {
    let lower = text.to_lowercase();
    let start = lower.find(marker)? + marker.len();
    let rest = lower[start..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].parse::<f64>().ok()
}

fn numeric_words(text: &str) -> impl Iterator<Item = f64> + '_ {
    text.split_whitespace().filter_map(|w| w.parse::<f64>().ok())
}

/// Two integer digits in 20..=50, a dot, one or two decimals.
fn cape_shaped(word: &str) -> bool {
    let Some((int, frac)) = word.split_once('.') else {
        return false;
    };
    let int_ok = int.len() == 2
        && int.chars().all(|c| c.is_ascii_digit())
        && matches!(int.parse::<u32>(), Ok(20..=50));
    let frac_ok = (1..=2).contains(&frac.len()) && frac.chars().all(|c| c.is_ascii_digit());
    int_ok && frac_ok
}
