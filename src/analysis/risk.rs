use serde::Serialize;
use std::fmt;

/// Risk tier of a crash index score. Closed set, ordered from calm to severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
    High,
    Extreme,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::Elevated,
        RiskLevel::High,
        RiskLevel::Extreme,
    ];

    /// Upper bounds are inclusive: 20 is still Low, 21 is Moderate.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=20 => RiskLevel::Low,
            21..=40 => RiskLevel::Moderate,
            41..=60 => RiskLevel::Elevated,
            61..=80 => RiskLevel::High,
            _ => RiskLevel::Extreme,
        }
    }

    /// Inclusive score range covered by this tier.
    pub fn score_range(&self) -> (u8, u8) {
        match self {
            RiskLevel::Low => (0, 20),
            RiskLevel::Moderate => (21, 40),
            RiskLevel::Elevated => (41, 60),
            RiskLevel::High => (61, 80),
            RiskLevel::Extreme => (81, 100),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Elevated => "Elevated",
            RiskLevel::High => "High",
            RiskLevel::Extreme => "Extreme",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Market conditions are favorable. Risk of crash is minimal.",
            RiskLevel::Moderate => "Some warning signs present. Monitor market closely.",
            RiskLevel::Elevated => "Multiple risk factors detected. Consider reducing exposure.",
            RiskLevel::High => "Significant crash risk. Defensive positioning recommended.",
            RiskLevel::Extreme => "EXTREME RISK! Crash may be imminent or in progress.",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(21), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(41), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_score(61), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(81), RiskLevel::Extreme);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Extreme);
    }

    #[test]
    fn test_ranges_agree_with_classifier() {
        for level in RiskLevel::ALL {
            let (lo, hi) = level.score_range();
            assert_eq!(RiskLevel::from_score(lo), level);
            assert_eq!(RiskLevel::from_score(hi), level);
        }
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(serde_json::to_string(&RiskLevel::Elevated).unwrap(), "\"Elevated\"");
        assert_eq!(RiskLevel::Extreme.to_string(), "Extreme");
    }

    #[test]
    fn test_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::High < RiskLevel::Extreme);
    }
}
