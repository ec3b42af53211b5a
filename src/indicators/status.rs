//! Healthy / caution / warning bands for presentational status badges.
//!
//! Each indicator has one band table. The classifier and the threshold text
//! both read it, so the two can never drift apart. The warning range is
//! never written down: it is whatever the healthy and caution bands leave
//! uncovered.

use serde::Serialize;
use std::cmp::Ordering;
use std::ops::Bound::{self, Excluded, Included, Unbounded};

use super::registry::{format_thousands, IndicatorKind, Registry, UnitType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    Healthy,
    Caution,
    Warning,
}

/// A contiguous range of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lo: Bound<f64>,
    pub hi: Bound<f64>,
}

impl Band {
    pub const fn new(lo: Bound<f64>, hi: Bound<f64>) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_lo = match self.lo {
            Included(x) => value >= x,
            Excluded(x) => value > x,
            Unbounded => true,
        };
        let below_hi = match self.hi {
            Included(x) => value <= x,
            Excluded(x) => value < x,
            Unbounded => true,
        };
        above_lo && below_hi
    }

    fn is_empty(&self) -> bool {
        match (self.lo, self.hi) {
            (Included(a), Included(b)) => a > b,
            (Included(a), Excluded(b)) | (Excluded(a), Included(b)) | (Excluded(a), Excluded(b)) => a >= b,
            _ => false,
        }
    }
}

pub struct StatusBands {
    pub healthy: &'static [Band],
    pub caution: &'static [Band],
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdText {
    pub healthy: String,
    pub caution: String,
    pub warning: String,
    pub description: &'static str,
}

const fn band(lo: Bound<f64>, hi: Bound<f64>) -> Band {
    Band::new(lo, hi)
}

static CPI: StatusBands = StatusBands {
    healthy: &[band(Included(1.5), Included(3.0))],
    caution: &[band(Included(1.0), Excluded(1.5)), band(Excluded(3.0), Included(4.0))],
    description: "Fed targets ~2% inflation. Too low = deflation risk, too high = overheating.",
};

static TEN_YEAR: StatusBands = StatusBands {
    healthy: &[band(Included(2.0), Included(4.0))],
    caution: &[band(Unbounded, Excluded(2.0)), band(Excluded(4.0), Included(5.0))],
    description: "Very low = recession fears, very high = rate shock risk.",
};

static GDP: StatusBands = StatusBands {
    healthy: &[band(Included(1.5), Unbounded)],
    caution: &[band(Included(0.0), Excluded(1.5))],
    description: "Negative growth = recession. Slow growth increases recession risk.",
};

static CONFIDENCE: StatusBands = StatusBands {
    healthy: &[band(Excluded(100.0), Unbounded)],
    caution: &[band(Included(85.0), Included(100.0))],
    description: "Consumer spending drives ~70% of US GDP. Low confidence precedes slowdowns.",
};

static UNEMPLOYMENT: StatusBands = StatusBands {
    healthy: &[band(Included(3.5), Included(5.0))],
    caution: &[band(Excluded(5.0), Included(5.5))],
    description: "3.5-5% is natural unemployment. Above 5.5% signals labor market weakness.",
};

static YIELD_CURVE: StatusBands = StatusBands {
    healthy: &[band(Excluded(0.5), Unbounded)],
    caution: &[band(Included(0.0), Included(0.5))],
    description: "Inverted yield curve has predicted every recession since 1955.",
};

static JOBLESS: StatusBands = StatusBands {
    healthy: &[band(Unbounded, Excluded(250_000.0))],
    caution: &[band(Included(250_000.0), Included(350_000.0))],
    description: "Weekly jobless claims spike before recessions. Leading labor indicator.",
};

static SHILLER: StatusBands = StatusBands {
    healthy: &[band(Included(15.0), Included(25.0))],
    caution: &[band(Included(10.0), Excluded(15.0)), band(Excluded(25.0), Included(35.0))],
    description: "Cyclically adjusted P/E ratio. Values >35 indicate bubble territory.",
};

static FED_FUNDS: StatusBands = StatusBands {
    healthy: &[band(Included(0.0), Included(3.0))],
    caution: &[band(Excluded(3.0), Included(5.0))],
    description: "Shows Fed policy stance. Rates >5% are restrictive and can trigger recessions.",
};

static CREDIT_SPREAD: StatusBands = StatusBands {
    healthy: &[band(Unbounded, Excluded(400.0))],
    caution: &[band(Included(400.0), Included(600.0))],
    description: "High yield bond spread. Widening spreads indicate credit market stress.",
};

/// Indicators that carry a status badge, in display order.
pub const STATUS_INDICATORS: [IndicatorKind; 10] = [
    IndicatorKind::CpiYoY,
    IndicatorKind::TenYearYield,
    IndicatorKind::GdpGrowth,
    IndicatorKind::ConsumerConfidence,
    IndicatorKind::Unemployment,
    IndicatorKind::YieldCurve,
    IndicatorKind::JoblessClaims,
    IndicatorKind::ShillerPe,
    IndicatorKind::FedFunds,
    IndicatorKind::CreditSpread,
];

pub fn bands(kind: IndicatorKind) -> Option<&'static StatusBands> {
    match kind {
        IndicatorKind::CpiYoY => Some(&CPI),
        IndicatorKind::TenYearYield => Some(&TEN_YEAR),
        IndicatorKind::GdpGrowth => Some(&GDP),
        IndicatorKind::ConsumerConfidence => Some(&CONFIDENCE),
        IndicatorKind::Unemployment => Some(&UNEMPLOYMENT),
        IndicatorKind::YieldCurve => Some(&YIELD_CURVE),
        IndicatorKind::JoblessClaims => Some(&JOBLESS),
        IndicatorKind::ShillerPe => Some(&SHILLER),
        IndicatorKind::FedFunds => Some(&FED_FUNDS),
        IndicatorKind::CreditSpread => Some(&CREDIT_SPREAD),
        _ => None,
    }
}

/// Status of `value` for `kind`, or `None` if the indicator has no badge.
pub fn classify(kind: IndicatorKind, value: f64) -> Option<IndicatorStatus> {
    let table = bands(kind)?;
    let status = if table.healthy.iter().any(|b| b.contains(value)) {
        IndicatorStatus::Healthy
    } else if table.caution.iter().any(|b| b.contains(value)) {
        IndicatorStatus::Caution
    } else {
        IndicatorStatus::Warning
    };
    Some(status)
}

/// Human-readable ranges for the tooltip / methodology page.
pub fn thresholds(kind: IndicatorKind) -> Option<ThresholdText> {
    let table = bands(kind)?;
    let unit = Registry::get_metadata(kind).unit;

    let mut covered: Vec<Band> = table.healthy.iter().chain(table.caution.iter()).copied().collect();
    covered.sort_by(|a, b| cmp_lower(a.lo, b.lo));

    Some(ThresholdText {
        healthy: describe(table.healthy, unit),
        caution: describe(table.caution, unit),
        warning: describe(&uncovered(&covered), unit),
        description: table.description,
    })
}

/// Gaps left on the real line by `sorted` (ordered by lower bound).
fn uncovered(sorted: &[Band]) -> Vec<Band> {
    let mut gaps = Vec::new();
    // Upper edge of everything covered so far; None = nothing yet.
    let mut reach: Option<Bound<f64>> = None;

    for b in sorted {
        let gap_lo = match reach {
            None => Unbounded,
            Some(Unbounded) => return gaps,
            Some(edge) => flip(edge),
        };
        let gap = Band::new(gap_lo, flip(b.lo));
        if b.lo != Unbounded && !gap.is_empty() {
            gaps.push(gap);
        }
        reach = Some(match reach {
            None => b.hi,
            Some(edge) => max_upper(edge, b.hi),
        });
    }

    match reach {
        None => gaps.push(Band::new(Unbounded, Unbounded)),
        Some(Unbounded) => {}
        Some(edge) => gaps.push(Band::new(flip(edge), Unbounded)),
    }
    gaps
}

fn flip(bound: Bound<f64>) -> Bound<f64> {
    match bound {
        Included(x) => Excluded(x),
        Excluded(x) => Included(x),
        Unbounded => Unbounded,
    }
}

fn cmp_lower(a: Bound<f64>, b: Bound<f64>) -> Ordering {
    match (a, b) {
        (Unbounded, Unbounded) => Ordering::Equal,
        (Unbounded, _) => Ordering::Less,
        (_, Unbounded) => Ordering::Greater,
        (Included(x), Included(y)) | (Excluded(x), Excluded(y)) => x.total_cmp(&y),
        (Included(x), Excluded(y)) => x.total_cmp(&y).then(Ordering::Less),
        (Excluded(x), Included(y)) => x.total_cmp(&y).then(Ordering::Greater),
    }
}

fn max_upper(a: Bound<f64>, b: Bound<f64>) -> Bound<f64> {
    match (a, b) {
        (Unbounded, _) | (_, Unbounded) => Unbounded,
        (Included(x), Excluded(y)) if x == y => Included(x),
        (Excluded(x), Included(y)) if x == y => Included(y),
        (Included(x), Included(y)) | (Included(x), Excluded(y)) | (Excluded(x), Included(y)) | (Excluded(x), Excluded(y)) => {
            if x >= y { a } else { b }
        }
    }
}

fn describe(bands: &[Band], unit: UnitType) -> String {
    if bands.is_empty() {
        return "none".to_string();
    }
    bands
        .iter()
        .map(|b| describe_band(b, unit))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn describe_band(b: &Band, unit: UnitType) -> String {
    let v = |x: f64| threshold_value(x, unit);
    match (b.lo, b.hi) {
        (Unbounded, Unbounded) => "any value".to_string(),
        (Unbounded, Excluded(x)) => format!("< {}", v(x)),
        (Unbounded, Included(x)) => format!("<= {}", v(x)),
        (Excluded(x), Unbounded) => format!("> {}", v(x)),
        (Included(x), Unbounded) => format!(">= {}", v(x)),
        (Included(x), Included(y)) if x == y => format!("= {}", v(x)),
        (Included(x) | Excluded(x), Included(y) | Excluded(y)) => format!("{} - {}", v(x), v(y)),
    }
}

fn threshold_value(x: f64, unit: UnitType) -> String {
    match unit {
        UnitType::Percent => format!("{:.1}%", x),
        UnitType::BasisPoints => format!("{} bps", x),
        UnitType::Count => format_thousands(x),
        _ => format!("{}", x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpi_status() {
        assert_eq!(classify(IndicatorKind::CpiYoY, 2.0), Some(IndicatorStatus::Healthy));
        assert_eq!(classify(IndicatorKind::CpiYoY, 3.0), Some(IndicatorStatus::Healthy));
        assert_eq!(classify(IndicatorKind::CpiYoY, 3.5), Some(IndicatorStatus::Caution));
        assert_eq!(classify(IndicatorKind::CpiYoY, 1.2), Some(IndicatorStatus::Caution));
        assert_eq!(classify(IndicatorKind::CpiYoY, 0.5), Some(IndicatorStatus::Warning));
        assert_eq!(classify(IndicatorKind::CpiYoY, 4.5), Some(IndicatorStatus::Warning));
    }

    #[test]
    fn test_strict_boundaries() {
        // 100 is caution, only values above 100 are healthy
        assert_eq!(classify(IndicatorKind::ConsumerConfidence, 100.0), Some(IndicatorStatus::Caution));
        assert_eq!(classify(IndicatorKind::ConsumerConfidence, 100.1), Some(IndicatorStatus::Healthy));
        assert_eq!(classify(IndicatorKind::ConsumerConfidence, 84.9), Some(IndicatorStatus::Warning));

        assert_eq!(classify(IndicatorKind::YieldCurve, 0.5), Some(IndicatorStatus::Caution));
        assert_eq!(classify(IndicatorKind::YieldCurve, -0.01), Some(IndicatorStatus::Warning));

        assert_eq!(classify(IndicatorKind::JoblessClaims, 250_000.0), Some(IndicatorStatus::Caution));
        assert_eq!(classify(IndicatorKind::CreditSpread, 600.0), Some(IndicatorStatus::Caution));
        assert_eq!(classify(IndicatorKind::CreditSpread, 601.0), Some(IndicatorStatus::Warning));
    }

    #[test]
    fn test_low_unemployment_is_warning() {
        assert_eq!(classify(IndicatorKind::Unemployment, 3.0), Some(IndicatorStatus::Warning));
        assert_eq!(classify(IndicatorKind::Unemployment, 5.2), Some(IndicatorStatus::Caution));
    }

    #[test]
    fn test_no_bands_for_market_series() {
        assert_eq!(classify(IndicatorKind::Vix, 30.0), None);
        assert!(thresholds(IndicatorKind::Sp500).is_none());
    }

    #[test]
    fn test_threshold_text_derived_from_bands() {
        let cpi = thresholds(IndicatorKind::CpiYoY).unwrap();
        assert_eq!(cpi.healthy, "1.5% - 3.0%");
        assert_eq!(cpi.caution, "1.0% - 1.5% or 3.0% - 4.0%");
        assert_eq!(cpi.warning, "< 1.0% or > 4.0%");

        let spread = thresholds(IndicatorKind::CreditSpread).unwrap();
        assert_eq!(spread.healthy, "< 400 bps");
        assert_eq!(spread.warning, "> 600 bps");

        let claims = thresholds(IndicatorKind::JoblessClaims).unwrap();
        assert_eq!(claims.caution, "250,000 - 350,000");
        assert_eq!(claims.warning, "> 350,000");

        let shiller = thresholds(IndicatorKind::ShillerPe).unwrap();
        assert_eq!(shiller.warning, "< 10 or > 35");

        let gdp = thresholds(IndicatorKind::GdpGrowth).unwrap();
        assert_eq!(gdp.healthy, ">= 1.5%");
        assert_eq!(gdp.warning, "< 0.0%");
    }

    #[test]
    fn test_uncovered_text_agrees_with_classifier() {
        for kind in STATUS_INDICATORS {
            let table = bands(kind).unwrap();
            let mut covered: Vec<Band> = table.healthy.iter().chain(table.caution.iter()).copied().collect();
            covered.sort_by(|a, b| cmp_lower(a.lo, b.lo));
            let gaps = uncovered(&covered);

            let mut probe = -100.0;
            while probe < 500_000.0 {
                let in_gap = gaps.iter().any(|g| g.contains(probe));
                let is_warning = classify(kind, probe) == Some(IndicatorStatus::Warning);
                assert_eq!(in_gap, is_warning, "{:?} disagrees at {}", kind, probe);
                probe += if probe.abs() < 1000.0 { 0.25 } else { 2500.0 };
            }
        }
    }
}
