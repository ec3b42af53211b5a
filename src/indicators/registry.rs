use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::indicators::scale::PercentToBps;
use crate::indicators::yoy::YearOverYear;
use crate::indicators::DerivedSeries;

// ============================================================================
// ENUMS
// ============================================================================

/// Every indicator the engine knows about.
///
/// `Sp500Change7d` / `Sp500Change30d` are derived from the S&P 500 series at
/// snapshot time and are never fetched on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    CpiYoY,
    PceYoY,
    Unemployment,
    TenYearYield,
    GdpGrowth,
    ConsumerConfidence,
    TotalDebt,
    DebtToGdp,
    YieldCurve,
    JoblessClaims,
    FedFunds,
    CreditSpread,
    ShillerPe,
    Vix,
    Sp500,
    Sp500Change7d,
    Sp500Change30d,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 17] = [
        IndicatorKind::CpiYoY,
        IndicatorKind::PceYoY,
        IndicatorKind::Unemployment,
        IndicatorKind::TenYearYield,
        IndicatorKind::GdpGrowth,
        IndicatorKind::ConsumerConfidence,
        IndicatorKind::TotalDebt,
        IndicatorKind::DebtToGdp,
        IndicatorKind::YieldCurve,
        IndicatorKind::JoblessClaims,
        IndicatorKind::FedFunds,
        IndicatorKind::CreditSpread,
        IndicatorKind::ShillerPe,
        IndicatorKind::Vix,
        IndicatorKind::Sp500,
        IndicatorKind::Sp500Change7d,
        IndicatorKind::Sp500Change30d,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            IndicatorKind::CpiYoY => "cpi_yoy",
            IndicatorKind::PceYoY => "pce_yoy",
            IndicatorKind::Unemployment => "unemployment_rate",
            IndicatorKind::TenYearYield => "us_10y",
            IndicatorKind::GdpGrowth => "gdp_growth",
            IndicatorKind::ConsumerConfidence => "consumer_confidence",
            IndicatorKind::TotalDebt => "total_public_debt",
            IndicatorKind::DebtToGdp => "debt_to_gdp",
            IndicatorKind::YieldCurve => "yield_curve_10y_2y",
            IndicatorKind::JoblessClaims => "initial_jobless_claims",
            IndicatorKind::FedFunds => "fed_funds_rate",
            IndicatorKind::CreditSpread => "hy_spread",
            IndicatorKind::ShillerPe => "shiller_pe",
            IndicatorKind::Vix => "vix",
            IndicatorKind::Sp500 => "sp500",
            IndicatorKind::Sp500Change7d => "sp500_change_7d",
            IndicatorKind::Sp500Change30d => "sp500_change_30d",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.slug() == slug)
    }

    /// Display name from the registry.
    pub fn name(&self) -> &'static str {
        Registry::get_metadata(*self).name
    }

    /// Formats a value with the indicator's canonical unit and precision.
    pub fn format_value(&self, value: f64) -> String {
        Registry::get_metadata(*self).unit.format(value)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceType {
    Fred,
    Yahoo,
    /// Point-in-time scalar scraped from multpl.com (Alpha Vantage fallback).
    Multpl,
    Calculated,
}

/// Defines how the indicator value should be formatted/displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitType {
    /// Percentage (e.g., 4.26 -> "4.26%")
    Percent,
    /// Basis points (e.g., 412 -> "412 bps")
    BasisPoints,
    /// Raw head-count (e.g., 231000 -> "231,000")
    Count,
    /// Unitless index (e.g., Shiller P/E 36.2)
    Index,
    /// Already in Millions of USD from source (e.g., FRED GFDEBTN)
    Millions,
    /// USD Price (e.g., 512.3 -> "$512.30")
    UsdPrice,
}

impl UnitType {
    pub fn format(&self, value: f64) -> String {
        match self {
            UnitType::Percent => format!("{:.2}%", value),
            UnitType::BasisPoints => format!("{:.0} bps", value),
            UnitType::Count => format_thousands(value),
            UnitType::Index => format!("{:.1}", value),
            UnitType::Millions => format!("${:.2}T", value / 1_000_000.0),
            UnitType::UsdPrice => format!("${:.2}", value),
        }
    }
}

/// How far back a FRED request reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lookback {
    /// Relative to today (YoY series need more than 13 months).
    MonthsBack(u32),
    /// Fixed `YYYY-MM-DD` start date.
    Since(&'static str),
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorMetadata {
    pub kind: IndicatorKind,
    pub name: &'static str,
    pub source: SourceType,
    pub description: &'static str,
    pub source_symbol: Option<&'static str>,
    pub unit: UnitType,
    /// FRED `frequency` parameter ("m", "q", "w", "d").
    pub frequency: Option<&'static str>,
    pub lookback: Lookback,
    /// Shown by presentational displays when no live value exists.
    /// Never used on the scoring path.
    pub display_fallback: Option<f64>,
}

// Helper macro to reduce boilerplate
macro_rules! ind {
    ($kind:expr, $name:expr, $source:expr, $desc:expr, $sym:expr, $unit:expr, $freq:expr, $lookback:expr, $fallback:expr) => {
        IndicatorMetadata {
            kind: $kind,
            name: $name,
            source: $source,
            description: $desc,
            source_symbol: $sym,
            unit: $unit,
            frequency: $freq,
            lookback: $lookback,
            display_fallback: $fallback,
        }
    };
}

// ============================================================================
// STATIC INDICATOR REGISTRY (Lazy initialization, O(1) lookup)
// ============================================================================

static INDICATORS: Lazy<Vec<IndicatorMetadata>> = Lazy::new(|| {
    use IndicatorKind::*;
    use Lookback::*;
    use SourceType::*;

    vec![
        // =====================================================================
        // FRED - INFLATION
        // =====================================================================
        ind!(CpiYoY, "CPI YoY", Fred,
             "Headline consumer inflation, year-over-year", Some("CPIAUCNS"), UnitType::Percent, Some("m"), MonthsBack(24), Some(2.8)),
        ind!(PceYoY, "PCE Inflation YoY", Fred,
             "Fed's preferred inflation gauge, year-over-year", Some("PCEPI"), UnitType::Percent, Some("m"), MonthsBack(24), None),

        // =====================================================================
        // FRED - LABOR & GROWTH
        // =====================================================================
        ind!(Unemployment, "Unemployment", Fred,
             "Civilian unemployment rate", Some("UNRATE"), UnitType::Percent, Some("m"), Since("2020-01-01"), Some(4.2)),
        ind!(JoblessClaims, "Jobless Claims", Fred,
             "Weekly initial unemployment insurance claims", Some("ICSA"), UnitType::Count, Some("w"), MonthsBack(24), Some(220_000.0)),
        ind!(GdpGrowth, "GDP Growth", Fred,
             "Real GDP growth, annualized quarterly rate", Some("A191RL1Q225SBEA"), UnitType::Percent, Some("q"), MonthsBack(24), Some(2.1)),
        ind!(ConsumerConfidence, "Consumer Confidence", Fred,
             "University of Michigan consumer sentiment", Some("UMCSENT"), UnitType::Index, Some("m"), MonthsBack(24), Some(95.0)),

        // =====================================================================
        // FRED - RATES & CREDIT
        // =====================================================================
        ind!(TenYearYield, "10Y Yield", Fred,
             "10-year Treasury constant maturity yield", Some("GS10"), UnitType::Percent, Some("m"), Since("2015-01-01"), Some(4.2)),
        ind!(YieldCurve, "Yield Curve", Fred,
             "10Y minus 2Y Treasury spread. Negative = inverted", Some("T10Y2Y"), UnitType::Percent, Some("d"), MonthsBack(24), Some(0.5)),
        ind!(FedFunds, "Fed Funds Rate", Fred,
             "Effective federal funds rate", Some("FEDFUNDS"), UnitType::Percent, Some("m"), MonthsBack(24), Some(4.5)),
        ind!(CreditSpread, "Credit Spread", Fred,
             "High yield option-adjusted spread. Rising = credit stress", Some("BAMLH0A0HYM2"), UnitType::BasisPoints, Some("d"), MonthsBack(24), Some(350.0)),

        // =====================================================================
        // FRED - FISCAL
        // =====================================================================
        ind!(TotalDebt, "Total Public Debt", Fred,
             "Federal debt: total public debt", Some("GFDEBTN"), UnitType::Millions, Some("q"), MonthsBack(24), None),
        ind!(DebtToGdp, "Debt to GDP", Fred,
             "Federal debt as percent of GDP", Some("GFDEGDQ188S"), UnitType::Percent, Some("q"), MonthsBack(24), None),

        // =====================================================================
        // VALUATION & MARKETS
        // =====================================================================
        ind!(ShillerPe, "Shiller P/E", Multpl,
             "Cyclically adjusted P/E of the S&P 500", None, UnitType::Index, None, MonthsBack(0), Some(30.0)),
        ind!(Vix, "VIX", Yahoo,
             "Fear gauge. >30 = high fear, <15 = complacency", Some("^VIX"), UnitType::Index, None, MonthsBack(1), None),
        ind!(Sp500, "S&P 500", Yahoo,
             "S&P 500 ETF daily close", Some("SPY"), UnitType::UsdPrice, None, MonthsBack(1), None),
        ind!(Sp500Change7d, "S&P 500 7-Day Change", Calculated,
             "Trailing 7-day percentage change of the S&P 500", None, UnitType::Percent, None, MonthsBack(1), None),
        ind!(Sp500Change30d, "S&P 500 30-Day Change", Calculated,
             "Trailing 30-day percentage change of the S&P 500", None, UnitType::Percent, None, MonthsBack(1), None),
    ]
});

static INDICATOR_MAP: Lazy<HashMap<IndicatorKind, usize>> = Lazy::new(|| {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(idx, meta)| (meta.kind, idx))
        .collect()
});

// ============================================================================
// REGISTRY API
// ============================================================================

pub struct Registry;

impl Registry {
    pub fn get_all_indicators() -> &'static [IndicatorMetadata] {
        &INDICATORS
    }

    /// O(1) lookup. Every `IndicatorKind` has an entry.
    pub fn get_metadata(kind: IndicatorKind) -> &'static IndicatorMetadata {
        let idx = INDICATOR_MAP[&kind];
        &INDICATORS[idx]
    }

    /// Indicators pulled from an upstream provider (everything not calculated).
    pub fn get_fetchable() -> impl Iterator<Item = &'static IndicatorMetadata> {
        INDICATORS.iter().filter(|i| i.source != SourceType::Calculated)
    }

    pub fn get_by_source(source: SourceType) -> Vec<&'static IndicatorMetadata> {
        INDICATORS.iter().filter(|i| i.source == source).collect()
    }

    /// Transformation applied to the normalized upstream series, if any.
    pub fn get_calculator(kind: IndicatorKind) -> Option<Box<dyn DerivedSeries + Send + Sync>> {
        match kind {
            IndicatorKind::CpiYoY | IndicatorKind::PceYoY => Some(Box::new(YearOverYear)),
            IndicatorKind::CreditSpread => Some(Box::new(PercentToBps)),
            _ => None,
        }
    }
}

/// Integer rendering with comma thousands separators: 420000 -> "420,000".
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}
