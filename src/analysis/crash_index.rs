use chrono::{DateTime, Utc};
use serde::Serialize;

use super::risk::RiskLevel;
use super::snapshot::IndicatorSnapshot;
use crate::indicators::registry::IndicatorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Leading,
    Concurrent,
    Lagging,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Leading, Tier::Concurrent, Tier::Lagging];

    pub fn max_points(&self) -> f64 {
        match self {
            Tier::Leading => 40.0,
            Tier::Concurrent => 35.0,
            Tier::Lagging => 25.0,
        }
    }

    fn index(&self) -> usize {
        match self {
            Tier::Leading => 0,
            Tier::Concurrent => 1,
            Tier::Lagging => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Below,
    Above,
}

/// One step of a piecewise-constant scoring table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub comparison: Comparison,
    pub limit: f64,
    pub points: f64,
    /// Factor text, completed with the formatted value.
    pub label: &'static str,
}

impl Breakpoint {
    /// NaN never matches.
    pub fn matches(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Below => value < self.limit,
            Comparison::Above => value > self.limit,
        }
    }
}

const fn below(limit: f64, points: f64, label: &'static str) -> Breakpoint {
    Breakpoint { comparison: Comparison::Below, limit, points, label }
}

const fn above(limit: f64, points: f64, label: &'static str) -> Breakpoint {
    Breakpoint { comparison: Comparison::Above, limit, points, label }
}

/// Breakpoints for one input, most severe first.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub input: IndicatorKind,
    pub breakpoints: &'static [Breakpoint],
}

/// Scoring of one indicator. Steps are tried in order and the first matching
/// breakpoint wins, which lets the S&P 500 rule fall back from the 30-day
/// return to the 7-day return.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRule {
    pub name: &'static str,
    pub tier: Tier,
    pub max_points: f64,
    pub steps: &'static [Step],
}

/// Award of a single rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub input: IndicatorKind,
    pub points: f64,
    pub factor: String,
}

impl ScoringRule {
    /// Points and factor text for this rule, or `None` when no breakpoint
    /// matched or every input is absent.
    pub fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Option<Award> {
        self.steps.iter().find_map(|step| {
            let value = snapshot.value(step.input)?;
            step.breakpoints
                .iter()
                .find(|bp| bp.matches(value))
                .map(|bp| Award {
                    input: step.input,
                    points: bp.points,
                    factor: format!("{} ({})", bp.label, step.input.format_value(value)),
                })
        })
    }
}

/// Scoring table in evaluation order; factors come out in this order too.
pub static SCORING_RULES: [ScoringRule; 11] = [
    // Leading
    ScoringRule {
        name: "Yield Curve (10Y-2Y)",
        tier: Tier::Leading,
        max_points: 15.0,
        steps: &[Step {
            input: IndicatorKind::YieldCurve,
            breakpoints: &[
                below(-0.5, 15.0, "Yield curve deeply inverted"),
                below(0.0, 7.5, "Yield curve inverted"),
                below(0.5, 3.75, "Yield curve flattening"),
            ],
        }],
    },
    ScoringRule {
        name: "Credit Spreads",
        tier: Tier::Leading,
        max_points: 15.0,
        steps: &[Step {
            input: IndicatorKind::CreditSpread,
            breakpoints: &[
                above(600.0, 15.0, "Credit spreads at crisis levels"),
                above(400.0, 7.5, "Credit spreads widening"),
            ],
        }],
    },
    ScoringRule {
        name: "Shiller P/E Ratio",
        tier: Tier::Leading,
        max_points: 10.0,
        steps: &[Step {
            input: IndicatorKind::ShillerPe,
            breakpoints: &[
                above(35.0, 10.0, "Shiller P/E in bubble territory"),
                above(30.0, 5.0, "Shiller P/E highly elevated"),
                above(25.0, 2.5, "Shiller P/E above historical average"),
            ],
        }],
    },
    // Concurrent
    ScoringRule {
        name: "VIX",
        tier: Tier::Concurrent,
        max_points: 12.0,
        steps: &[Step {
            input: IndicatorKind::Vix,
            breakpoints: &[
                above(40.0, 12.0, "Extreme market fear, VIX"),
                above(30.0, 9.0, "High market fear, VIX"),
                above(20.0, 4.0, "Elevated volatility, VIX"),
            ],
        }],
    },
    ScoringRule {
        name: "Fed Funds Rate",
        tier: Tier::Concurrent,
        max_points: 10.0,
        steps: &[Step {
            input: IndicatorKind::FedFunds,
            breakpoints: &[
                above(5.5, 10.0, "Fed policy highly restrictive"),
                above(5.0, 7.0, "Fed policy restrictive"),
                above(4.0, 5.0, "Fed policy tight"),
            ],
        }],
    },
    ScoringRule {
        name: "Jobless Claims",
        tier: Tier::Concurrent,
        max_points: 8.0,
        steps: &[Step {
            input: IndicatorKind::JoblessClaims,
            breakpoints: &[
                above(400_000.0, 8.0, "Jobless claims surging"),
                above(300_000.0, 4.0, "Jobless claims rising"),
            ],
        }],
    },
    ScoringRule {
        name: "CPI YoY",
        tier: Tier::Concurrent,
        max_points: 5.0,
        steps: &[Step {
            input: IndicatorKind::CpiYoY,
            breakpoints: &[
                above(5.0, 5.0, "High inflation, CPI YoY"),
                above(4.0, 2.5, "Elevated inflation, CPI YoY"),
            ],
        }],
    },
    // Lagging
    ScoringRule {
        name: "S&P 500 Performance",
        tier: Tier::Lagging,
        max_points: 10.0,
        steps: &[
            Step {
                input: IndicatorKind::Sp500Change30d,
                breakpoints: &[
                    below(-20.0, 10.0, "S&P 500 in bear market over 30 days"),
                    below(-10.0, 7.0, "S&P 500 correction over 30 days"),
                ],
            },
            Step {
                input: IndicatorKind::Sp500Change7d,
                breakpoints: &[below(-5.0, 4.0, "S&P 500 sharp drop over 7 days")],
            },
        ],
    },
    ScoringRule {
        name: "Unemployment",
        tier: Tier::Lagging,
        max_points: 8.0,
        steps: &[Step {
            input: IndicatorKind::Unemployment,
            breakpoints: &[
                above(6.0, 8.0, "High unemployment"),
                above(5.5, 4.0, "Rising unemployment"),
            ],
        }],
    },
    ScoringRule {
        name: "GDP Growth",
        tier: Tier::Lagging,
        max_points: 4.0,
        steps: &[Step {
            input: IndicatorKind::GdpGrowth,
            breakpoints: &[
                below(0.0, 4.0, "GDP contracting"),
                below(1.0, 2.0, "GDP growth weak"),
            ],
        }],
    },
    ScoringRule {
        name: "Consumer Confidence",
        tier: Tier::Lagging,
        max_points: 3.0,
        steps: &[Step {
            input: IndicatorKind::ConsumerConfidence,
            breakpoints: &[
                below(85.0, 3.0, "Consumer confidence very low"),
                below(95.0, 1.5, "Consumer confidence weakening"),
            ],
        }],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    #[serde(rename = "leadingIndicators")]
    pub leading: f64,
    #[serde(rename = "concurrentIndicators")]
    pub concurrent: f64,
    #[serde(rename = "laggingIndicators")]
    pub lagging: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrashIndexResult {
    pub score: u8,
    pub risk: RiskLevel,
    pub breakdown: Breakdown,
    pub factors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Scores a snapshot. Pure: the only time input is `timestamp`.
///
/// Breakdown values are rounded to one decimal independently of the integer
/// score, so they may not add up to it exactly.
pub fn calculate_crash_index(snapshot: &IndicatorSnapshot, timestamp: DateTime<Utc>) -> CrashIndexResult {
    let mut tier_points = [0.0_f64; 3];
    let mut factors = Vec::new();

    for rule in SCORING_RULES.iter() {
        if let Some(award) = rule.evaluate(snapshot) {
            tier_points[rule.tier.index()] += award.points;
            factors.push(award.factor);
        }
    }

    let capped = |tier: Tier| tier_points[tier.index()].clamp(0.0, tier.max_points());
    let leading = capped(Tier::Leading);
    let concurrent = capped(Tier::Concurrent);
    let lagging = capped(Tier::Lagging);

    let score = (leading + concurrent + lagging).round().clamp(0.0, 100.0) as u8;

    CrashIndexResult {
        score,
        risk: RiskLevel::from_score(score),
        breakdown: Breakdown {
            leading: round_one_decimal(leading),
            concurrent: round_one_decimal(concurrent),
            lagging: round_one_decimal(lagging),
        },
        factors,
        timestamp,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
