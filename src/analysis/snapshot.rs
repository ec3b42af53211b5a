use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::timeseries::{latest_value, resolve_or_abstain, trailing_change};
use crate::error::ScoringUnavailable;
use crate::indicators::registry::IndicatorKind;
use crate::models::Series;

/// Trailing windows of the two S&P 500 returns, in calendar days.
pub const SP500_SHORT_WINDOW_DAYS: i64 = 7;
pub const SP500_LONG_WINDOW_DAYS: i64 = 30;

/// Every macro series fetched in one refresh, plus the point-in-time
/// Shiller P/E which has no history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MacroIndicators {
    series: HashMap<IndicatorKind, Series>,
    current_shiller_pe: Option<f64>,
}

impl MacroIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: IndicatorKind, series: Series) {
        self.series.insert(kind, series);
    }

    pub fn with_series(mut self, kind: IndicatorKind, series: Series) -> Self {
        self.insert(kind, series);
        self
    }

    pub fn set_shiller_pe(&mut self, value: Option<f64>) {
        self.current_shiller_pe = value;
    }

    pub fn with_shiller_pe(mut self, value: Option<f64>) -> Self {
        self.set_shiller_pe(value);
        self
    }

    pub fn series(&self, kind: IndicatorKind) -> Option<&Series> {
        self.series.get(&kind)
    }

    pub fn current_shiller_pe(&self) -> Option<f64> {
        self.current_shiller_pe
    }

    /// Latest value; a missing or empty series is `None`.
    pub fn latest(&self, kind: IndicatorKind) -> Option<f64> {
        if kind == IndicatorKind::ShillerPe {
            return self.current_shiller_pe;
        }
        self.series(kind).and_then(latest_value)
    }

    /// Number of series that came back with at least one observation.
    pub fn populated(&self) -> usize {
        self.series.values().filter(|s| !s.is_empty()).count()
    }
}

/// Daily S&P 500 and VIX closes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketData {
    pub sp500: Series,
    pub vix: Series,
}

/// Latest value of each scored indicator, the input of the crash index.
///
/// VIX and the two S&P 500 returns are required; everything else is
/// optional and simply contributes nothing when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub vix: f64,
    #[serde(rename = "sp500Change7d")]
    pub sp500_change_7d: f64,
    #[serde(rename = "sp500Change30d")]
    pub sp500_change_30d: f64,
    #[serde(rename = "cpiYoY")]
    pub cpi_yoy: Option<f64>,
    pub unemployment_rate: Option<f64>,
    pub gdp_growth_rate: Option<f64>,
    pub consumer_confidence_index: Option<f64>,
    pub ten_year_yield: Option<f64>,
    pub yield_curve_spread: Option<f64>,
    pub initial_jobless_claims: Option<f64>,
    pub shiller_pe: Option<f64>,
    pub fed_funds_rate: Option<f64>,
    pub high_yield_credit_spread_bps: Option<f64>,
}

impl IndicatorSnapshot {
    /// Snapshot with only the required inputs set.
    pub fn new(vix: f64, sp500_change_7d: f64, sp500_change_30d: f64) -> Self {
        Self {
            vix,
            sp500_change_7d,
            sp500_change_30d,
            cpi_yoy: None,
            unemployment_rate: None,
            gdp_growth_rate: None,
            consumer_confidence_index: None,
            ten_year_yield: None,
            yield_curve_spread: None,
            initial_jobless_claims: None,
            shiller_pe: None,
            fed_funds_rate: None,
            high_yield_credit_spread_bps: None,
        }
    }

    /// Sets the field that holds `kind`. Kinds the snapshot does not carry
    /// are ignored.
    pub fn with(mut self, kind: IndicatorKind, value: f64) -> Self {
        match kind {
            IndicatorKind::Vix => self.vix = value,
            IndicatorKind::Sp500Change7d => self.sp500_change_7d = value,
            IndicatorKind::Sp500Change30d => self.sp500_change_30d = value,
            IndicatorKind::CpiYoY => self.cpi_yoy = Some(value),
            IndicatorKind::Unemployment => self.unemployment_rate = Some(value),
            IndicatorKind::GdpGrowth => self.gdp_growth_rate = Some(value),
            IndicatorKind::ConsumerConfidence => self.consumer_confidence_index = Some(value),
            IndicatorKind::TenYearYield => self.ten_year_yield = Some(value),
            IndicatorKind::YieldCurve => self.yield_curve_spread = Some(value),
            IndicatorKind::JoblessClaims => self.initial_jobless_claims = Some(value),
            IndicatorKind::ShillerPe => self.shiller_pe = Some(value),
            IndicatorKind::FedFunds => self.fed_funds_rate = Some(value),
            IndicatorKind::CreditSpread => self.high_yield_credit_spread_bps = Some(value),
            IndicatorKind::PceYoY
            | IndicatorKind::TotalDebt
            | IndicatorKind::DebtToGdp
            | IndicatorKind::Sp500 => {}
        }
        self
    }

    /// Value held for `kind`, `None` when absent or not part of the snapshot.
    pub fn value(&self, kind: IndicatorKind) -> Option<f64> {
        match kind {
            IndicatorKind::Vix => Some(self.vix),
            IndicatorKind::Sp500Change7d => Some(self.sp500_change_7d),
            IndicatorKind::Sp500Change30d => Some(self.sp500_change_30d),
            IndicatorKind::CpiYoY => self.cpi_yoy,
            IndicatorKind::Unemployment => self.unemployment_rate,
            IndicatorKind::GdpGrowth => self.gdp_growth_rate,
            IndicatorKind::ConsumerConfidence => self.consumer_confidence_index,
            IndicatorKind::TenYearYield => self.ten_year_yield,
            IndicatorKind::YieldCurve => self.yield_curve_spread,
            IndicatorKind::JoblessClaims => self.initial_jobless_claims,
            IndicatorKind::ShillerPe => self.shiller_pe,
            IndicatorKind::FedFunds => self.fed_funds_rate,
            IndicatorKind::CreditSpread => self.high_yield_credit_spread_bps,
            IndicatorKind::PceYoY
            | IndicatorKind::TotalDebt
            | IndicatorKind::DebtToGdp
            | IndicatorKind::Sp500 => None,
        }
    }
}

/// Builds the scoring snapshot, abstaining when a required input is missing.
///
/// Optional indicators with no data stay `None`. No default is ever
/// substituted here; that decision belongs to presentation only.
pub fn build_snapshot(
    macro_indicators: &MacroIndicators,
    market: &MarketData,
) -> Result<IndicatorSnapshot, ScoringUnavailable> {
    let vix = resolve_or_abstain(&market.vix)
        .map_err(|e| debug!(error = %e, "VIX unavailable"))
        .ok();
    let change_7d = trailing_change(&market.sp500, SP500_SHORT_WINDOW_DAYS);
    let change_30d = trailing_change(&market.sp500, SP500_LONG_WINDOW_DAYS);

    let (vix, change_7d, change_30d) = match (vix, change_7d, change_30d) {
        (Some(v), Some(c7), Some(c30)) => (v, c7, c30),
        (v, c7, c30) => {
            let missing: Vec<IndicatorKind> = [
                (IndicatorKind::Vix, v.is_none()),
                (IndicatorKind::Sp500Change7d, c7.is_none()),
                (IndicatorKind::Sp500Change30d, c30.is_none()),
            ]
            .into_iter()
            .filter_map(|(kind, absent)| absent.then_some(kind))
            .collect();
            let err = ScoringUnavailable { missing };
            warn!(error = %err, "Skipping crash index scoring");
            return Err(err);
        }
    };

    let optional = |kind: IndicatorKind| macro_indicators.latest(kind);

    Ok(IndicatorSnapshot {
        vix,
        sp500_change_7d: change_7d,
        sp500_change_30d: change_30d,
        cpi_yoy: optional(IndicatorKind::CpiYoY),
        unemployment_rate: optional(IndicatorKind::Unemployment),
        gdp_growth_rate: optional(IndicatorKind::GdpGrowth),
        consumer_confidence_index: optional(IndicatorKind::ConsumerConfidence),
        ten_year_yield: optional(IndicatorKind::TenYearYield),
        yield_curve_spread: optional(IndicatorKind::YieldCurve),
        initial_jobless_claims: optional(IndicatorKind::JoblessClaims),
        shiller_pe: optional(IndicatorKind::ShillerPe),
        fed_funds_rate: optional(IndicatorKind::FedFunds),
        high_yield_credit_spread_bps: optional(IndicatorKind::CreditSpread),
    })
}
