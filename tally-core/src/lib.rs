//! Tally Core - Fundamental types
//!
//! This crate provides the core types used throughout Tally:
//! - `MetricsError`: Named precondition failures raised by the engine
//! - `TallyError`: Structured errors for the calculator layer
//! - `ValidationError`: Per-field input rejections
//! - `Period` / `PaymentFrequency`: Sampling and payment cadence

mod error;
mod period;
mod validation;

pub use error::{codes, MetricsError, Severity, TallyError, Violation};
pub use period::{PaymentFrequency, PaymentInterval, Period};
pub use validation::{ValidationError, Validator};

/// Round to a fixed number of decimal places (half away from zero)
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Round a monetary amount to cents, for presentation only
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{
        round_money, round_to, MetricsError, PaymentFrequency, Period, Severity, TallyError,
        ValidationError, Validator,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(510.2345), 510.23);
        assert_eq!(round_money(510.235_000_1), 510.24);
        assert_eq!(round_money(-12.345_6), -12.35);
        assert_eq!(round_money(0.0), 0.0);
    }

    #[test]
    fn test_round_to_places() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(1.5, 0), 2.0);
    }
}
