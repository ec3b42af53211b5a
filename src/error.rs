use crate::indicators::registry::IndicatorKind;
use serde::Serialize;
use thiserror::Error;

/// A series had no latest value when the scoring path asked for one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no observations available for {series}")]
pub struct Unavailable {
    pub series: String,
}

/// Scoring was skipped because required inputs were missing.
///
/// A zero score means "low risk", so an incomplete snapshot is reported as
/// this error instead of being scored.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("crash index unavailable, missing required indicators: {}", format_missing(.missing))]
pub struct ScoringUnavailable {
    pub missing: Vec<IndicatorKind>,
}

fn format_missing(missing: &[IndicatorKind]) -> String {
    missing.iter().map(|k| k.slug()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("FRED_API_KEY is empty or missing")]
    MissingFredKey,
}
