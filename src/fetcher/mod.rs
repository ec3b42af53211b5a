use anyhow::Result;
use async_trait::async_trait;

use crate::models::RawObservation;

pub mod fred;
pub mod multpl;
pub mod yahoo;

/// An upstream provider of time series. Implementations return records in
/// whatever order the provider uses; normalization happens downstream.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_raw(&self, symbol: &str) -> Result<Vec<RawObservation>>;
}

/// A point-in-time scalar with no history (the Shiller P/E).
#[async_trait]
pub trait ScalarSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_current(&self) -> Option<f64>;
}
