//! Sampling periods and payment frequencies
//!
//! Both map text from the UI onto a per-year factor. Unrecognised text falls
//! back to an explicit named default instead of a silent match arm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling frequency of a return or value series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    /// Used whenever the period text is not recognised
    pub const DEFAULT: Period = Period::Monthly;

    /// Periods per year, used to scale variance and return to an annual basis
    pub fn annualization_factor(self) -> f64 {
        match self {
            Period::Daily => 252.0,
            Period::Weekly => 52.0,
            Period::Monthly => 12.0,
            Period::Quarterly => 4.0,
            Period::Yearly => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    /// Parse period text, substituting [`Period::DEFAULT`] for anything unknown
    pub fn parse_or_default(s: &str) -> Period {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(period = s, fallback = Period::DEFAULT.as_str(), "unknown period");
            Period::DEFAULT
        })
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::DEFAULT
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Period::Daily),
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            "quarterly" | "quarter" => Ok(Period::Quarterly),
            "yearly" | "annual" | "annually" | "year" => Ok(Period::Yearly),
            other => Err(format!("unknown period '{}'", other)),
        }
    }
}

impl From<String> for Period {
    fn from(s: String) -> Self {
        Period::parse_or_default(&s)
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a loan payment falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentFrequency {
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

/// Calendar step between two consecutive payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentInterval {
    Days(u32),
    Months(u32),
}

impl PaymentFrequency {
    pub const DEFAULT: PaymentFrequency = PaymentFrequency::Monthly;

    pub fn payments_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::BiWeekly => 26,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnually => 2,
            PaymentFrequency::Annually => 1,
        }
    }

    pub fn interval(self) -> PaymentInterval {
        match self {
            PaymentFrequency::Weekly => PaymentInterval::Days(7),
            PaymentFrequency::BiWeekly => PaymentInterval::Days(14),
            PaymentFrequency::Monthly => PaymentInterval::Months(1),
            PaymentFrequency::Quarterly => PaymentInterval::Months(3),
            PaymentFrequency::SemiAnnually => PaymentInterval::Months(6),
            PaymentFrequency::Annually => PaymentInterval::Months(12),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::BiWeekly => "bi-weekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::SemiAnnually => "semi-annually",
            PaymentFrequency::Annually => "annually",
        }
    }

    pub fn parse_or_default(s: &str) -> PaymentFrequency {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(
                frequency = s,
                fallback = PaymentFrequency::DEFAULT.as_str(),
                "unknown payment frequency"
            );
            PaymentFrequency::DEFAULT
        })
    }
}

impl Default for PaymentFrequency {
    fn default() -> Self {
        PaymentFrequency::DEFAULT
    }
}

impl FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "biweekly" => Ok(PaymentFrequency::BiWeekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            "quarterly" => Ok(PaymentFrequency::Quarterly),
            "semiannually" | "semiannual" => Ok(PaymentFrequency::SemiAnnually),
            "annually" | "annual" | "yearly" => Ok(PaymentFrequency::Annually),
            _ => Err(format!("unknown payment frequency '{}'", s)),
        }
    }
}

impl From<String> for PaymentFrequency {
    fn from(s: String) -> Self {
        PaymentFrequency::parse_or_default(&s)
    }
}

impl From<PaymentFrequency> for String {
    fn from(f: PaymentFrequency) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annualization_factors() {
        assert_eq!(Period::Daily.annualization_factor(), 252.0);
        assert_eq!(Period::Weekly.annualization_factor(), 52.0);
        assert_eq!(Period::Monthly.annualization_factor(), 12.0);
        assert_eq!(Period::Quarterly.annualization_factor(), 4.0);
        assert_eq!(Period::Yearly.annualization_factor(), 1.0);
    }

    #[test]
    fn test_unknown_period_defaults_to_monthly() {
        assert_eq!(Period::parse_or_default("fortnightly"), Period::Monthly);
        assert_eq!(Period::parse_or_default("fortnightly").annualization_factor(), 12.0);
        assert!("fortnightly".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_serde() {
        let p: Period = serde_json::from_str("\"Quarterly\"").unwrap();
        assert_eq!(p, Period::Quarterly);
        let p: Period = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(p, Period::DEFAULT);
        assert_eq!(serde_json::to_string(&Period::Weekly).unwrap(), "\"weekly\"");
    }

    #[test]
    fn test_payment_frequency_parsing() {
        assert_eq!("semi-annually".parse::<PaymentFrequency>(), Ok(PaymentFrequency::SemiAnnually));
        assert_eq!("Bi-Weekly".parse::<PaymentFrequency>(), Ok(PaymentFrequency::BiWeekly));
        assert_eq!(PaymentFrequency::parse_or_default("hourly"), PaymentFrequency::Monthly);
        assert_eq!(PaymentFrequency::Quarterly.payments_per_year(), 4);
        assert_eq!(PaymentFrequency::SemiAnnually.interval(), PaymentInterval::Months(6));
    }
}
