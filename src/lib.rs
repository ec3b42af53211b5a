//! Crash-risk index over macroeconomic and market indicators.
//!
//! Upstream series are fetched concurrently, normalized into chronological
//! order, reduced to a snapshot of latest values and scored into a 0-100
//! index with a risk level.

pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod models;
