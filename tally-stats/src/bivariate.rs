//! Bivariate functions: covariance, correlation

use crate::central::mean;
use crate::dispersion::variance_with_mean;
use crate::helpers::{require_min_count, require_same_length};
use tally_core::MetricsError;

/// Sample covariance (divides by n-1)
pub fn covariance(x: &[f64], y: &[f64]) -> Result<f64, MetricsError> {
    require_same_length(x, y)?;
    require_min_count(x, 2)?;

    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let sum_products: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();

    Ok(sum_products / (x.len() - 1) as f64)
}

/// Pearson correlation coefficient r
///
/// Returns 0 when either series is constant. Floating-point overshoot past
/// ±1 is clamped back onto the interval.
pub fn correlation(x: &[f64], y: &[f64]) -> Result<f64, MetricsError> {
    let cov = covariance(x, y)?;
    let sd_x = variance_with_mean(x, mean(x)?)?.sqrt();
    let sd_y = variance_with_mean(y, mean(y)?)?.sqrt();

    let denom = sd_x * sd_y;
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok((cov / denom).clamp(-1.0, 1.0))
}
