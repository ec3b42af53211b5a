use crate::models::Series;

pub mod registry;
pub mod scale;
pub mod status;
pub mod yoy;

/// A series computed from one normalized upstream series.
///
/// Implementations are pure: no I/O, no clock, same input gives same output.
pub trait DerivedSeries {
    /// Returns the unique slug (e.g., "yoy")
    fn slug(&self) -> &str;

    /// Returns the display name
    fn name(&self) -> &str;

    /// Builds the derived series. Insufficient input yields an empty series.
    fn derive(&self, input: &Series) -> Series;
}
