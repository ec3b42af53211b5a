//! Plain-text explanation of how the crash index is built, rendered from the
//! same tables the calculator and the status classifier use.

use std::fmt::{self, Write};

use super::crash_index::{Breakpoint, Comparison, Step, Tier, SCORING_RULES};
use super::risk::RiskLevel;
use crate::indicators::status::{thresholds, STATUS_INDICATORS};

fn tier_title(tier: Tier) -> &'static str {
    match tier {
        Tier::Leading => "Leading indicators (predict 6-18 months ahead)",
        Tier::Concurrent => "Concurrent indicators (current conditions)",
        Tier::Lagging => "Lagging indicators (confirm trends)",
    }
}

fn breakpoint_line(step: &Step, bp: &Breakpoint, multi_input: bool) -> String {
    let op = match bp.comparison {
        Comparison::Below => "<",
        Comparison::Above => ">",
    };
    let subject = if multi_input { format!("{} ", step.input.name()) } else { String::new() };
    format!(
        "      {}{} {}: {} pts ({})",
        subject,
        op,
        step.input.format_value(bp.limit),
        bp.points,
        bp.label
    )
}

/// Risk bands, tier tables and indicator status ranges as text.
pub fn render() -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write(&mut out);
    out
}

/// Writes the methodology to any `fmt::Write` sink.
pub fn write(out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "CRASH INDEX METHODOLOGY")?;
    writeln!(out)?;
    writeln!(out, "Score 0-100, the sum of three capped tiers.")?;
    writeln!(out)?;
    writeln!(out, "Risk levels:")?;
    for level in RiskLevel::ALL {
        let (lo, hi) = level.score_range();
        writeln!(out, "  {:>3}-{:<3} {:<9} {}", lo, hi, level.label(), level.description())?;
    }

    for tier in Tier::ALL {
        writeln!(out)?;
        writeln!(out, "{} - max {} pts", tier_title(tier), tier.max_points())?;
        for rule in SCORING_RULES.iter().filter(|r| r.tier == tier) {
            writeln!(out, "  {} (max {} pts)", rule.name, rule.max_points)?;
            let multi_input = rule.steps.len() > 1;
            for step in rule.steps {
                for bp in step.breakpoints {
                    writeln!(out, "{}", breakpoint_line(step, bp, multi_input))?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Indicator status ranges:")?;
    for kind in STATUS_INDICATORS {
        if let Some(text) = thresholds(kind) {
            writeln!(out, "  {}", kind.name())?;
            writeln!(out, "    healthy: {}", text.healthy)?;
            writeln!(out, "    caution: {}", text.caution)?;
            writeln!(out, "    warning: {}", text.warning)?;
            writeln!(out, "    {}", text.description)?;
        }
    }
    Ok(())
}
