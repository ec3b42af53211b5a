pub mod cache;
pub mod clock;
pub mod orchestrator;
pub mod rate_limiter;
pub mod scheduler;
pub mod timeseries;
