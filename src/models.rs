use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated value of an indicator, day precision.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Chronologically ascending observations of one named indicator.
///
/// Built fresh on every refresh and never mutated afterwards; a newer fetch
/// replaces the whole series.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Series {
    name: String,
    points: Vec<Observation>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<Observation>) -> Self {
        Self { name: name.into(), points }
    }

    /// An empty series, which is how a failed or skipped fetch is represented.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.points.last()
    }
}

/// Upstream value as delivered: FRED sends strings ("4.33", "."), chart APIs
/// send numbers or null.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

/// One record of an upstream response before normalization.
///
/// Providers disagree on field names, so the common spellings are accepted
/// as aliases.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RawObservation {
    #[serde(alias = "Date", alias = "period", alias = "timestamp")]
    pub date: String,
    #[serde(alias = "close", alias = "Close", alias = "price", default)]
    pub value: RawValue,
}

impl RawObservation {
    pub fn text(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self { date: date.into(), value: RawValue::Text(value.into()) }
    }

    pub fn number(date: impl Into<String>, value: f64) -> Self {
        Self { date: date.into(), value: RawValue::Number(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_observation_aliases() {
        let fred: RawObservation =
            serde_json::from_value(json!({ "date": "2024-01-01", "value": "3.1" })).unwrap();
        assert_eq!(fred.value, RawValue::Text("3.1".to_string()));

        let chart: RawObservation =
            serde_json::from_value(json!({ "Date": "2024-01-02", "close": 4810.5 })).unwrap();
        assert_eq!(chart.date, "2024-01-02");
        assert_eq!(chart.value, RawValue::Number(4810.5));

        let missing: RawObservation =
            serde_json::from_value(json!({ "period": "2024-01-03" })).unwrap();
        assert_eq!(missing.value, RawValue::Missing);

        let null: RawObservation =
            serde_json::from_value(json!({ "timestamp": "2024-01-04", "price": null })).unwrap();
        assert_eq!(null.value, RawValue::Missing);
    }

    #[test]
    fn test_series_latest() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let series = Series::new(
            "VIX",
            vec![Observation::new(d("2024-01-01"), 13.0), Observation::new(d("2024-01-02"), 14.5)],
        );
        assert_eq!(series.latest().map(|o| o.value), Some(14.5));
        assert!(Series::empty("VIX").latest().is_none());
    }
}
