use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info, warn};

use crate::analysis::crash_index::{calculate_crash_index, CrashIndexResult};
use crate::analysis::dashboard::{dashboard_readings, IndicatorReading};
use crate::analysis::snapshot::{build_snapshot, MacroIndicators, MarketData};
use crate::config::Config;
use crate::core::cache::TtlCache;
use crate::core::clock::{Clock, SystemClock};
use crate::core::rate_limiter::RateLimiter;
use crate::core::timeseries::{normalize, SourceOrder};
use crate::error::ScoringUnavailable;
use crate::fetcher::fred::FredFetcher;
use crate::fetcher::multpl::ShillerPeFetcher;
use crate::fetcher::yahoo::YahooFetcher;
use crate::fetcher::{DataSource, ScalarSource};
use crate::indicators::registry::{IndicatorKind, IndicatorMetadata, Registry, SourceType};
use crate::models::{RawObservation, Series};

/// One upstream provider per source type.
#[derive(Clone)]
pub struct Sources {
    pub fred: Arc<dyn DataSource>,
    pub yahoo: Arc<dyn DataSource>,
    pub shiller: Arc<dyn ScalarSource>,
}

/// An indicator whose fetch failed during a refresh.
#[derive(Debug, Clone, Serialize)]
pub struct FetchFailure {
    pub kind: IndicatorKind,
    pub error: String,
}

/// Everything one refresh produced.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub macro_indicators: MacroIndicators,
    pub market: MarketData,
    pub crash_index: Option<CrashIndexResult>,
    pub unavailable: Option<ScoringUnavailable>,
    pub readings: Vec<IndicatorReading>,
    pub failures: Vec<FetchFailure>,
    pub completed_at: DateTime<Utc>,
}

enum Outcome {
    Series(IndicatorKind, Result<Vec<RawObservation>>),
    Shiller(Option<f64>),
}

pub struct Orchestrator {
    sources: Sources,
    clock: Arc<dyn Clock>,
    throttle: bool,
}

impl Orchestrator {
    pub fn new(sources: Sources, clock: Arc<dyn Clock>) -> Self {
        Self { sources, clock, throttle: true }
    }

    /// Live fetchers built from configuration. Fails without a FRED key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config.require_fred_key()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(TtlCache::in_memory(clock.clone(), config.shiller_cache_ttl));

        let sources = Sources {
            fred: Arc::new(FredFetcher::new(key.to_string(), config.http_timeout).with_clock(clock.clone())),
            yahoo: Arc::new(YahooFetcher::new()),
            shiller: Arc::new(ShillerPeFetcher::new(
                cache,
                config.alpha_vantage_api_key.clone(),
                config.http_timeout,
            )),
        };
        Ok(Self::new(sources, clock))
    }

    /// Skips the pre-request jitter; for stubbed sources.
    pub fn without_throttle(mut self) -> Self {
        self.throttle = false;
        self
    }

    fn source_for(&self, meta: &IndicatorMetadata) -> Option<Arc<dyn DataSource>> {
        match meta.source {
            SourceType::Fred => Some(self.sources.fred.clone()),
            SourceType::Yahoo => Some(self.sources.yahoo.clone()),
            SourceType::Multpl | SourceType::Calculated => None,
        }
    }

    /// Fetches every indicator concurrently and scores the result.
    ///
    /// A failed fetch is logged and leaves that series empty; the rest of the
    /// refresh carries on. Scoring is skipped, not zeroed, when a required
    /// input is missing.
    pub async fn refresh(&self) -> RefreshReport {
        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        let mut task_kinds: HashMap<Id, IndicatorKind> = HashMap::new();

        for meta in Registry::get_fetchable() {
            let (Some(source), Some(symbol)) = (self.source_for(meta), meta.source_symbol) else {
                continue;
            };
            let kind = meta.kind;
            let source_type = meta.source;
            let throttle = self.throttle;

            let handle = tasks.spawn(async move {
                if throttle {
                    RateLimiter::wait(source_type).await;
                }
                Outcome::Series(kind, source.fetch_raw(symbol).await)
            });
            task_kinds.insert(handle.id(), kind);
        }

        let shiller = self.sources.shiller.clone();
        let handle = tasks.spawn(async move { Outcome::Shiller(shiller.fetch_current().await) });
        task_kinds.insert(handle.id(), IndicatorKind::ShillerPe);

        let mut macro_indicators = MacroIndicators::new();
        let mut market = MarketData::default();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, Outcome::Series(kind, Ok(raw)))) => {
                    let series = to_series(kind, &raw);
                    debug!(indicator = kind.slug(), points = series.len(), "Series ready");
                    store(&mut macro_indicators, &mut market, kind, series);
                }
                Ok((_, Outcome::Series(kind, Err(e)))) => {
                    error!(indicator = kind.slug(), error = %e, "Fetch failed, continuing with empty series");
                    failures.push(FetchFailure { kind, error: e.to_string() });
                    store(&mut macro_indicators, &mut market, kind, Series::empty(kind.slug()));
                }
                Ok((_, Outcome::Shiller(value))) => macro_indicators.set_shiller_pe(value),
                Err(e) => match task_kinds.get(&e.id()).copied() {
                    Some(kind) => {
                        error!(indicator = kind.slug(), error = %e, "Fetch task aborted, continuing with empty series");
                        failures.push(FetchFailure { kind, error: e.to_string() });
                        if kind != IndicatorKind::ShillerPe {
                            store(&mut macro_indicators, &mut market, kind, Series::empty(kind.slug()));
                        }
                    }
                    None => error!(error = %e, "Fetch task aborted"),
                },
            }
        }

        let (crash_index, unavailable) = match build_snapshot(&macro_indicators, &market) {
            Ok(snapshot) => {
                let result = calculate_crash_index(&snapshot, self.clock.now());
                info!(score = result.score, risk = %result.risk, factors = result.factors.len(), "Crash index calculated");
                (Some(result), None)
            }
            Err(e) => (None, Some(e)),
        };

        if !failures.is_empty() {
            warn!(failed = failures.len(), "Refresh completed with failures");
        }

        let readings = dashboard_readings(&macro_indicators);

        RefreshReport {
            macro_indicators,
            market,
            crash_index,
            unavailable,
            readings,
            failures,
            completed_at: self.clock.now(),
        }
    }
}

/// Normalizes a raw response and applies the indicator's transform.
fn to_series(kind: IndicatorKind, raw: &[RawObservation]) -> Series {
    let order = match Registry::get_metadata(kind).source {
        SourceType::Fred => SourceOrder::Descending,
        _ => SourceOrder::Ascending,
    };
    let series = normalize(kind.slug(), raw, order);

    match Registry::get_calculator(kind) {
        Some(calculator) => {
            debug!(indicator = kind.slug(), transform = calculator.slug(), "Applying transform");
            calculator.derive(&series)
        }
        None => series,
    }
}

fn store(macro_indicators: &mut MacroIndicators, market: &mut MarketData, kind: IndicatorKind, series: Series) {
    match kind {
        IndicatorKind::Vix => market.vix = series,
        IndicatorKind::Sp500 => market.sp500 = series,
        _ => macro_indicators.insert(kind, series),
    }
}
