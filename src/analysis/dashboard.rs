use serde::Serialize;
use tracing::debug;

use super::snapshot::MacroIndicators;
use crate::core::timeseries::{resolve_or_fallback, Resolved};
use crate::indicators::registry::{IndicatorKind, Registry};
use crate::indicators::status::{classify, IndicatorStatus, STATUS_INDICATORS};

/// One badge on the status board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReading {
    pub kind: IndicatorKind,
    pub name: &'static str,
    pub value: f64,
    /// True when `value` is the registry's stand-in, not live data.
    pub is_fallback: bool,
    pub status: IndicatorStatus,
    pub formatted: String,
}

/// Readings for every status-tracked indicator, in display order.
///
/// Presentation only: missing series are replaced by their registry default
/// so the board always has something to show. The crash index never reads
/// these values.
pub fn dashboard_readings(macro_indicators: &MacroIndicators) -> Vec<IndicatorReading> {
    STATUS_INDICATORS
        .iter()
        .filter_map(|&kind| reading(macro_indicators, kind))
        .collect()
}

fn reading(macro_indicators: &MacroIndicators, kind: IndicatorKind) -> Option<IndicatorReading> {
    let meta = Registry::get_metadata(kind);
    let default = meta.display_fallback?;

    let missing = Resolved { value: default, is_fallback: true };
    let resolved = if kind == IndicatorKind::ShillerPe {
        macro_indicators
            .current_shiller_pe()
            .map(|value| Resolved { value, is_fallback: false })
            .unwrap_or(missing)
    } else {
        macro_indicators
            .series(kind)
            .map(|series| resolve_or_fallback(series, default))
            .unwrap_or(missing)
    };

    if resolved.is_fallback {
        debug!(indicator = kind.slug(), default, "Showing fallback value");
    }

    Some(IndicatorReading {
        kind,
        name: meta.name,
        value: resolved.value,
        is_fallback: resolved.is_fallback,
        status: classify(kind, resolved.value)?,
        formatted: kind.format_value(resolved.value),
    })
}
