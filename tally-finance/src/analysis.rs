//! Rule-based reading of metric records
//!
//! Pure threshold tables; nothing here feeds back into the numbers.

use crate::drawdown::{DrawdownMetrics, RECOVERY_DRAWDOWN_THRESHOLD};
use crate::risk::RiskMetrics;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Market sensitivity bands on |beta|
    pub fn from_beta(beta: f64) -> Self {
        match beta.abs() {
            b if b < 0.8 => RiskLevel::Low,
            b if b <= 1.2 => RiskLevel::Moderate,
            b if b <= 2.0 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    /// Bands on maximum drawdown, percent
    pub fn from_drawdown(max_drawdown: f64) -> Self {
        match max_drawdown {
            d if d < 10.0 => RiskLevel::Low,
            d if d < 20.0 => RiskLevel::Moderate,
            d if d < 35.0 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PerformanceGrade {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl PerformanceGrade {
    pub fn from_calmar(calmar: f64) -> Self {
        match calmar {
            c if c > 3.0 => PerformanceGrade::Excellent,
            c if c > 1.0 => PerformanceGrade::Good,
            c if c > 0.5 => PerformanceGrade::Fair,
            _ => PerformanceGrade::Poor,
        }
    }

    pub fn from_sharpe(sharpe: f64) -> Self {
        match sharpe {
            s if s > 2.0 => PerformanceGrade::Excellent,
            s if s > 1.0 => PerformanceGrade::Good,
            s if s > 0.5 => PerformanceGrade::Fair,
            _ => PerformanceGrade::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub risk_level: RiskLevel,
    pub grade: PerformanceGrade,
    pub recommendation: String,
}

pub fn assess_risk(metrics: &RiskMetrics) -> Assessment {
    let risk_level = RiskLevel::from_beta(metrics.beta);
    let grade = PerformanceGrade::from_sharpe(metrics.sharpe_ratio);

    let recommendation = if metrics.beta < 0.0 {
        "Moves against the market; useful as a hedge rather than a core holding.".to_string()
    } else if metrics.r_squared < 0.3 {
        "Market explains little of this asset's movement; beta is a weak guide here.".to_string()
    } else {
        match (risk_level, grade) {
            (RiskLevel::Low, PerformanceGrade::Good | PerformanceGrade::Excellent) => {
                "Defensive holding with strong risk-adjusted returns.".to_string()
            }
            (RiskLevel::High | RiskLevel::VeryHigh, PerformanceGrade::Poor | PerformanceGrade::Fair) => {
                "Amplifies market swings without being paid for it; consider reducing exposure.".to_string()
            }
            (level, grade) => format!(
                "{} market sensitivity with {} risk-adjusted returns.",
                capitalize(&level.to_string()),
                grade_word(grade)
            ),
        }
    };

    Assessment {
        risk_level,
        grade,
        recommendation,
    }
}

pub fn assess_drawdown(metrics: &DrawdownMetrics) -> Assessment {
    let risk_level = RiskLevel::from_drawdown(metrics.max_drawdown);
    let grade = PerformanceGrade::from_calmar(metrics.calmar_ratio);

    let recommendation = if metrics.max_drawdown == 0.0 {
        "No drawdown in this window; the Calmar ratio is not meaningful yet.".to_string()
    } else if metrics.recovery_time_years > 1.0 {
        format!(
            "Spent {:.1} years more than {}% below its peak; check whether that fits your horizon.",
            metrics.recovery_time_years, RECOVERY_DRAWDOWN_THRESHOLD
        )
    } else {
        match grade {
            PerformanceGrade::Excellent | PerformanceGrade::Good => {
                "Returns comfortably outweigh the worst decline.".to_string()
            }
            PerformanceGrade::Fair => "Returns only modestly outweigh the worst decline.".to_string(),
            PerformanceGrade::Poor => {
                "Drawdowns are large relative to returns; review position sizing.".to_string()
            }
        }
    };

    Assessment {
        risk_level,
        grade,
        recommendation,
    }
}

fn grade_word(grade: PerformanceGrade) -> &'static str {
    match grade {
        PerformanceGrade::Poor => "poor",
        PerformanceGrade::Fair => "fair",
        PerformanceGrade::Good => "good",
        PerformanceGrade::Excellent => "excellent",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
