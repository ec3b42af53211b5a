use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::indicators::registry::SourceType;

pub struct RateLimiter;

impl RateLimiter {
    /// Random pre-request delay window in milliseconds for a source.
    ///
    /// A refresh fires every FRED request at once; the jitter spreads that
    /// burst out so the upstream WAF doesn't see a spike.
    pub fn jitter_window(source: SourceType) -> (u64, u64) {
        match source {
            SourceType::Fred => (0, 750),
            SourceType::Yahoo => (0, 250),
            SourceType::Multpl => (0, 100),
            SourceType::Calculated => (0, 0),
        }
    }

    /// Wait appropriate duration based on the data source
    pub async fn wait(source: SourceType) {
        let (lo, hi) = Self::jitter_window(source);
        if hi == 0 {
            return;
        }
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(lo..hi)
        };
        sleep(Duration::from_millis(delay)).await;
    }
}

/// Retry policy for throttled or failing upstream calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub max_retries: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base: Duration::from_millis(500),
            cap: Duration::from_secs(8),
        }
    }
}

impl Backoff {
    /// No retries at all; used by tests and one-shot calls.
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// 429 and 5xx are worth another try, everything else is final.
    pub fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Deterministic part of the delay: `base * 2^attempt`, capped.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Delay before retry number `attempt` (0-based): the ceiling plus up to
    /// half of it again as random jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        let spread = ceiling.as_millis() as u64 / 2;
        let jitter = if spread == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=spread)
        };
        ceiling + Duration::from_millis(jitter)
    }

    pub async fn wait(&self, attempt: u32) {
        let delay = self.delay(attempt);
        debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
        sleep(delay).await;
    }
}
