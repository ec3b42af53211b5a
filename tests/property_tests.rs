//! Property tests for the scoring pipeline.
//!
//! Uses proptest to verify:
//! 1. YoY shape: short input is empty, long input has length n - 12 and the
//!    documented per-point formula
//! 2. Purity: the same snapshot and timestamp always score the same
//! 3. Bounds: score in [0, 100], every tier within its maximum
//! 4. Risk classification agrees with the score bands

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use crash_monitor_lib::analysis::crash_index::calculate_crash_index;
use crash_monitor_lib::analysis::risk::RiskLevel;
use crash_monitor_lib::analysis::snapshot::IndicatorSnapshot;
use crash_monitor_lib::core::timeseries::{normalize, SourceOrder};
use crash_monitor_lib::indicators::registry::IndicatorKind;
use crash_monitor_lib::indicators::yoy::yoy_change;
use crash_monitor_lib::models::{Observation, RawObservation, Series};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn monthly(values: &[f64]) -> Series {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| Observation::new(start + chrono::Months::new(i as u32), *v))
        .collect();
    Series::new("CPIAUCNS", points)
}

/// Price levels with the occasional exact zero.
fn arb_level() -> impl Strategy<Value = f64> {
    prop_oneof![
        9 => (1.0..500.0_f64).prop_map(|v| (v * 100.0).round() / 100.0),
        1 => Just(0.0),
    ]
}

fn arb_optional(range: std::ops::Range<f64>) -> impl Strategy<Value = Optional> {
    proptest::option::of(range)
}

type Optional = Option<f64>;

prop_compose! {
    fn arb_leading_concurrent()(
        curve in arb_optional(-3.0..3.0),
        spread in arb_optional(100.0..2000.0),
        shiller in arb_optional(5.0..60.0),
        fed in arb_optional(0.0..10.0),
        claims in arb_optional(150_000.0..900_000.0),
    ) -> [Optional; 5] {
        [curve, spread, shiller, fed, claims]
    }
}

prop_compose! {
    fn arb_macro_rest()(
        cpi in arb_optional(-3.0..15.0),
        unemployment in arb_optional(2.0..15.0),
        gdp in arb_optional(-10.0..10.0),
        confidence in arb_optional(40.0..120.0),
    ) -> [Optional; 4] {
        [cpi, unemployment, gdp, confidence]
    }
}

prop_compose! {
    fn arb_snapshot()(
        vix in 5.0..90.0_f64,
        c7 in -40.0..20.0_f64,
        c30 in -60.0..30.0_f64,
        first in arb_leading_concurrent(),
        rest in arb_macro_rest(),
    ) -> IndicatorSnapshot {
        let kinds = [
            IndicatorKind::YieldCurve,
            IndicatorKind::CreditSpread,
            IndicatorKind::ShillerPe,
            IndicatorKind::FedFunds,
            IndicatorKind::JoblessClaims,
            IndicatorKind::CpiYoY,
            IndicatorKind::Unemployment,
            IndicatorKind::GdpGrowth,
            IndicatorKind::ConsumerConfidence,
        ];
        let values = first.into_iter().chain(rest);

        let mut snapshot = IndicatorSnapshot::new(vix, c7, c30);
        for (kind, value) in kinds.into_iter().zip(values) {
            if let Some(v) = value {
                snapshot = snapshot.with(kind, v);
            }
        }
        snapshot
    }
}

// ── 1. YoY ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn yoy_short_input_is_empty(values in proptest::collection::vec(arb_level(), 0..13)) {
        prop_assert!(yoy_change(&monthly(&values)).is_empty());
    }

    #[test]
    fn yoy_matches_formula(values in proptest::collection::vec(arb_level(), 13..60)) {
        let input = monthly(&values);
        let output = yoy_change(&input);

        prop_assert_eq!(output.len(), values.len() - 12);
        for (i, point) in output.points().iter().enumerate() {
            let base = values[i];
            let expected = if base == 0.0 { 0.0 } else { (values[i + 12] - base) / base * 100.0 };
            prop_assert!(point.value.is_finite());
            prop_assert!((point.value - expected).abs() < 1e-9);
            prop_assert_eq!(point.date, input.points()[i + 12].date);
        }
    }

    /// Descending input is flipped, not sorted, and stays strictly increasing.
    #[test]
    fn normalize_descending_is_chronological(len in 1usize..40) {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let raw: Vec<RawObservation> = (0..len)
            .rev()
            .map(|i| RawObservation::text((start + Duration::days(i as i64)).format("%Y-%m-%d").to_string(), format!("{}", i)))
            .collect();

        let series = normalize("T10Y2Y", &raw, SourceOrder::Descending);
        prop_assert_eq!(series.len(), len);
        prop_assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
        prop_assert_eq!(series.latest().map(|o| o.value), Some((len - 1) as f64));
    }
}

// ── 2-4. Calculator ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn calculator_is_pure(snapshot in arb_snapshot(), secs in 0i64..2_000_000_000) {
        let ts = Utc.timestamp_opt(secs, 0).unwrap();
        prop_assert_eq!(calculate_crash_index(&snapshot, ts), calculate_crash_index(&snapshot.clone(), ts));
    }

    #[test]
    fn score_and_breakdown_bounded(snapshot in arb_snapshot()) {
        let result = calculate_crash_index(&snapshot, Utc::now());

        prop_assert!(result.score <= 100);
        prop_assert!((0.0..=40.0).contains(&result.breakdown.leading));
        prop_assert!((0.0..=35.0).contains(&result.breakdown.concurrent));
        prop_assert!((0.0..=25.0).contains(&result.breakdown.lagging));
        prop_assert_eq!(result.risk, RiskLevel::from_score(result.score));
    }

    #[test]
    fn required_only_never_scores_leading(vix in 5.0..90.0_f64, c7 in -40.0..20.0_f64, c30 in -60.0..30.0_f64) {
        let result = calculate_crash_index(&IndicatorSnapshot::new(vix, c7, c30), Utc::now());

        prop_assert_eq!(result.breakdown.leading, 0.0);
        prop_assert!(result.breakdown.concurrent <= 12.0);
        prop_assert!(result.factors.len() <= 2);
        prop_assert!(result.factors.iter().all(|f| f.contains("VIX") || f.contains("S&P 500")));
    }

    #[test]
    fn risk_level_total_and_monotone(a in 0u8..=100, b in 0u8..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(RiskLevel::from_score(lo) <= RiskLevel::from_score(hi));
    }
}
