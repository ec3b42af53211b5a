pub mod crash_index;
pub mod dashboard;
pub mod methodology;
pub mod risk;
pub mod snapshot;
