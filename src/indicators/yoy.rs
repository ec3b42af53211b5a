use super::DerivedSeries;
use crate::models::{Observation, Series};
use tracing::{info, warn};

/// Months between a value and its year-ago base.
pub const YOY_LAG: usize = 12;

pub struct YearOverYear;

impl DerivedSeries for YearOverYear {
    fn slug(&self) -> &str {
        "yoy"
    }

    fn name(&self) -> &str {
        "Year-over-Year % Change"
    }

    fn derive(&self, input: &Series) -> Series {
        yoy_change(input)
    }
}

/// Year-over-year percentage change of a monthly level series.
///
/// Output point `i` is `(in[i+12] - in[i]) / in[i] * 100`, dated `in[i+12]`.
/// Fewer than 13 inputs means there is not enough history yet and the result
/// is empty. A zero base yields `0.0` for that point.
pub fn yoy_change(input: &Series) -> Series {
    let points = input.points();

    if points.len() <= YOY_LAG {
        info!(series = input.name(), points = points.len(), "Not enough history for YoY calculation");
        return Series::empty(input.name());
    }

    let derived = points
        .iter()
        .zip(points.iter().skip(YOY_LAG))
        .map(|(base, current)| {
            if base.value == 0.0 {
                warn!(
                    series = input.name(),
                    base_date = %base.date,
                    date = %current.date,
                    "Zero base value in YoY calculation, emitting 0"
                );
                return Observation::new(current.date, 0.0);
            }
            let change = (current.value - base.value) / base.value * 100.0;
            Observation::new(current.date, change)
        })
        .collect();

    Series::new(input.name(), derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};

    fn monthly(values: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(start + Months::new(i as u32), *v))
            .collect();
        Series::new("CPI", points)
    }

    #[test]
    fn test_yoy_requires_thirteen_points() {
        assert!(yoy_change(&monthly(&[])).is_empty());
        assert!(yoy_change(&monthly(&[100.0; 12])).is_empty());
        assert_eq!(yoy_change(&monthly(&[100.0; 13])).len(), 1);
    }

    #[test]
    fn test_yoy_values_and_dates() {
        // 100, 101, ..., 113 -> first output compares 112 with 100
        let values: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let input = monthly(&values);
        let result = yoy_change(&input);

        assert_eq!(result.len(), 2);
        assert!((result.points()[0].value - 12.0).abs() < 1e-9);
        assert!((result.points()[1].value - (12.0 / 101.0 * 100.0)).abs() < 1e-9);
        assert_eq!(result.points()[0].date, input.points()[12].date);
        assert_eq!(result.points()[1].date, input.points()[13].date);
        assert_eq!(result.name(), "CPI");
    }

    #[test]
    fn test_yoy_zero_base_emits_zero() {
        let mut values = vec![0.0];
        values.extend(std::iter::repeat(50.0).take(12));
        let result = yoy_change(&monthly(&values));

        assert_eq!(result.len(), 1);
        assert_eq!(result.points()[0].value, 0.0);
        assert!(result.points()[0].value.is_finite());
    }

    #[test]
    fn test_yoy_through_trait() {
        let values: Vec<f64> = (0..25).map(|i| 300.0 + i as f64 * 0.75).collect();
        let derived = YearOverYear.derive(&monthly(&values));
        assert_eq!(derived.len(), 13);
        assert!(derived.points().iter().all(|o| o.value > 0.0));
    }
}
