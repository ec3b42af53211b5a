use super::DerivedSeries;
use crate::models::{Observation, Series};

/// FRED publishes the high-yield spread in percent; the engine works in bps.
pub struct PercentToBps;

impl DerivedSeries for PercentToBps {
    fn slug(&self) -> &str {
        "percent_to_bps"
    }

    fn name(&self) -> &str {
        "Percent to Basis Points"
    }

    fn derive(&self, input: &Series) -> Series {
        let points = input
            .points()
            .iter()
            .map(|o| Observation::new(o.date, o.value * 100.0))
            .collect();
        Series::new(input.name(), points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_percent_to_bps() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let input = Series::new("HY", vec![Observation::new(date, 3.12)]);
        let result = PercentToBps.derive(&input);

        assert_eq!(result.len(), 1);
        assert!((result.points()[0].value - 312.0).abs() < 1e-9);
        assert_eq!(result.points()[0].date, date);
    }
}
