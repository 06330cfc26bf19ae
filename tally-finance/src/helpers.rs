//! Common financial utilities

use tally_core::MetricsError;
use tally_stats::{require_finite, require_min_count};

/// Validate a series of absolute values (prices, balances).
///
/// At least `min` entries, all finite and strictly positive.
pub fn validate_value_series(values: &[f64], min: usize) -> Result<(), MetricsError> {
    require_min_count(values, min)?;
    require_finite(values)?;
    match values.iter().position(|v| *v <= 0.0) {
        Some(index) => Err(MetricsError::NonPositive { index }),
        None => Ok(()),
    }
}

/// Validate a return series: at least `min` entries, all finite
pub fn validate_return_series(returns: &[f64], min: usize) -> Result<(), MetricsError> {
    require_min_count(returns, min)?;
    require_finite(returns)
}

/// Annual rate in percent to a per-period decimal rate
pub fn periodic_rate(annual_rate_percent: f64, periods_per_year: f64) -> f64 {
    annual_rate_percent / 100.0 / periods_per_year
}

/// Fails unless `min <= value <= max`; NaN always fails
pub(crate) fn require_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), MetricsError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(MetricsError::out_of_range(name, value, min, max))
    }
}

/// Divide, falling back to zero for a zero denominator
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
