use crate::error::Unavailable;
use crate::models::{Observation, RawObservation, RawValue, Series};
use chrono::{DateTime, Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

/// Order in which a provider delivers its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrder {
    /// Newest first (FRED with `sort_order=desc`). Flipped, never sorted.
    Descending,
    /// Oldest first (chart APIs). Passed through.
    Ascending,
}

/// Value used in place of a non-numeric upstream value ("." and friends).
pub const NON_NUMERIC_FALLBACK: f64 = 0.0;

/// Converts raw upstream records into a chronological `Series`.
///
/// Values that do not parse as numbers become `NON_NUMERIC_FALLBACK` for every
/// series alike. Records without a usable date are dropped, since an
/// observation cannot exist without one.
pub fn normalize(name: &str, raw: &[RawObservation], order: SourceOrder) -> Series {
    let mut coerced = 0usize;
    let mut points = Vec::with_capacity(raw.len());

    for record in raw {
        let Some(date) = parse_date(&record.date) else {
            warn!(series = name, date = %record.date, "Dropping observation with unparseable date");
            continue;
        };

        let value = match parse_value(&record.value) {
            Some(v) => v,
            None => {
                debug!(series = name, %date, value = ?record.value, "Non-numeric value coerced to fallback");
                coerced += 1;
                NON_NUMERIC_FALLBACK
            }
        };

        points.push(Observation::new(date, value));
    }

    if order == SourceOrder::Descending {
        points.reverse();
    }

    if coerced > 0 {
        warn!(series = name, coerced, total = raw.len(), "Non-numeric observations coerced to {}", NON_NUMERIC_FALLBACK);
    }

    if points.windows(2).any(|w| w[0].date >= w[1].date) {
        warn!(series = name, "Normalized dates are not strictly increasing");
    }

    Series::new(name, points)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
}

fn parse_value(raw: &RawValue) -> Option<f64> {
    let value = match raw {
        RawValue::Number(v) => *v,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        RawValue::Missing => return None,
    };
    value.is_finite().then_some(value)
}

// ============================================================================
// LATEST-VALUE RESOLUTION
// ============================================================================

/// Value of the latest observation, if any.
pub fn latest_value(series: &Series) -> Option<f64> {
    series.latest().map(|o| o.value)
}

/// A value for display, flagged when it is a stand-in default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolved {
    pub value: f64,
    pub is_fallback: bool,
}

/// Latest value or `default`. Only for presentation, which must always
/// render something. Never use it to feed the crash index.
pub fn resolve_or_fallback(series: &Series, default: f64) -> Resolved {
    match latest_value(series) {
        Some(value) => Resolved { value, is_fallback: false },
        None => Resolved { value: default, is_fallback: true },
    }
}

/// Latest value or `Unavailable`, leaving the caller to skip computation.
pub fn resolve_or_abstain(series: &Series) -> Result<f64, Unavailable> {
    latest_value(series).ok_or_else(|| Unavailable { series: series.name().to_string() })
}

/// Percentage change over the trailing `days` calendar days.
///
/// The base is the first observation dated on or after `latest - days`, so a
/// window with gaps (weekends, holidays) still measures the full span it has.
/// Returns `None` with fewer than two points or a zero base.
pub fn trailing_change(series: &Series, days: i64) -> Option<f64> {
    let latest = series.latest()?;
    if series.len() < 2 {
        return None;
    }

    let cutoff = latest.date - Duration::days(days);
    let base = series.points().iter().find(|o| o.date >= cutoff)?;

    if base.date == latest.date || base.value == 0.0 {
        return None;
    }

    Some((latest.value - base.value) / base.value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> Series {
        Series::new("test", points.iter().map(|(d, v)| Observation::new(date(d), *v)).collect())
    }

    #[test]
    fn test_normalize_flips_descending() {
        let raw = vec![
            RawObservation::text("2024-03-01", "3.9"),
            RawObservation::text("2024-02-01", "3.8"),
            RawObservation::text("2024-01-01", "3.7"),
        ];
        let result = normalize("UNRATE", &raw, SourceOrder::Descending);

        assert_eq!(result.len(), 3);
        assert_eq!(result.points()[0].date, date("2024-01-01"));
        assert_eq!(result.points()[2].value, 3.9);
        assert_eq!(result.name(), "UNRATE");
    }

    #[test]
    fn test_normalize_flip_is_not_a_sort() {
        // Out-of-order input stays out of order after the flip
        let raw = vec![
            RawObservation::text("2024-01-01", "1"),
            RawObservation::text("2024-03-01", "3"),
            RawObservation::text("2024-02-01", "2"),
        ];
        let result = normalize("x", &raw, SourceOrder::Descending);
        let values: Vec<f64> = result.points().iter().map(|o| o.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_normalize_ascending_passes_through() {
        let raw = vec![
            RawObservation::number("2024-01-02", 4700.0),
            RawObservation::number("2024-01-03", 4710.5),
        ];
        let result = normalize("SPY", &raw, SourceOrder::Ascending);
        assert_eq!(result.points()[0].value, 4700.0);
        assert_eq!(result.points()[1].value, 4710.5);
    }

    #[test]
    fn test_normalize_coerces_non_numeric_to_zero() {
        let raw = vec![
            RawObservation::text("2024-01-03", "."),
            RawObservation::text("2024-01-02", "abc"),
            RawObservation { date: "2024-01-01".to_string(), value: RawValue::Missing },
        ];
        let result = normalize("T10Y2Y", &raw, SourceOrder::Descending);

        assert_eq!(result.len(), 3);
        assert!(result.points().iter().all(|o| o.value == NON_NUMERIC_FALLBACK));
    }

    #[test]
    fn test_normalize_drops_bad_dates() {
        let raw = vec![
            RawObservation::text("not-a-date", "1.0"),
            RawObservation::text("2024-05-01T00:00:00Z", "2.0"),
        ];
        let result = normalize("x", &raw, SourceOrder::Ascending);
        assert_eq!(result.len(), 1);
        assert_eq!(result.points()[0].date, date("2024-05-01"));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize("x", &[], SourceOrder::Descending).is_empty());
    }

    #[test]
    fn test_resolve_variants() {
        let empty = Series::empty("VIX");
        let full = series(&[("2024-01-01", 14.0), ("2024-01-02", 16.5)]);

        assert_eq!(latest_value(&full), Some(16.5));
        assert_eq!(latest_value(&empty), None);

        assert_eq!(resolve_or_fallback(&full, 15.0), Resolved { value: 16.5, is_fallback: false });
        assert_eq!(resolve_or_fallback(&empty, 15.0), Resolved { value: 15.0, is_fallback: true });

        assert_eq!(resolve_or_abstain(&full), Ok(16.5));
        assert_eq!(resolve_or_abstain(&empty), Err(Unavailable { series: "VIX".to_string() }));
    }

    #[test]
    fn test_trailing_change() {
        let spx = series(&[
            ("2024-03-01", 500.0),
            ("2024-03-04", 510.0),
            ("2024-03-25", 480.0),
            ("2024-03-28", 490.0),
            ("2024-03-29", 450.0),
        ]);

        // 30d window starts 2024-02-28 -> base is the first point, 500
        let change_30d = trailing_change(&spx, 30).unwrap();
        assert!((change_30d - (-10.0)).abs() < 1e-9);

        // 7d window starts 2024-03-22 -> base 480
        let change_7d = trailing_change(&spx, 7).unwrap();
        assert!((change_7d - (-6.25)).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_change_insufficient() {
        assert_eq!(trailing_change(&Series::empty("x"), 7), None);
        assert_eq!(trailing_change(&series(&[("2024-01-01", 1.0)]), 7), None);
        // Only the latest point falls inside the window
        assert_eq!(trailing_change(&series(&[("2024-01-01", 1.0), ("2024-02-01", 2.0)]), 7), None);
        assert_eq!(trailing_change(&series(&[("2024-01-01", 0.0), ("2024-01-02", 2.0)]), 7), None);
    }
}
