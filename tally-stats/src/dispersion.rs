//! Dispersion: sample and population variance, standard deviation
//!
//! `variance` is always the sample estimator (divides by n - 1). Covariance
//! and correlation use the same convention, so the population form lives
//! under its own name and is never picked implicitly.

use crate::central::mean;
use crate::helpers::{require_min_count, sum_squared_deviations};
use tally_core::MetricsError;

/// Sample variance (divides by n-1)
pub fn variance(numbers: &[f64]) -> Result<f64, MetricsError> {
    let m = mean(numbers)?;
    variance_with_mean(numbers, m)
}

/// Sample variance around a caller-supplied mean
pub fn variance_with_mean(numbers: &[f64], mean: f64) -> Result<f64, MetricsError> {
    require_min_count(numbers, 2)?;
    Ok(sum_squared_deviations(numbers, mean) / (numbers.len() - 1) as f64)
}

/// Population variance (divides by n)
pub fn population_variance(numbers: &[f64]) -> Result<f64, MetricsError> {
    let m = mean(numbers)?;
    Ok(sum_squared_deviations(numbers, m) / numbers.len() as f64)
}

/// Sample standard deviation
pub fn std_dev(numbers: &[f64]) -> Result<f64, MetricsError> {
    variance(numbers).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DATA: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn test_variance_is_sample() {
        // Σ(x-5)² = 32, n-1 = 7
        assert_relative_eq!(variance(&DATA).unwrap(), 32.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_population_variance() {
        assert_relative_eq!(population_variance(&DATA).unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_variance_with_mean_override() {
        // Around 0 instead of the true mean
        let v = variance_with_mean(&[1.0, -1.0, 1.0, -1.0], 0.0).unwrap();
        assert_relative_eq!(v, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_std_dev() {
        assert_relative_eq!(std_dev(&DATA).unwrap(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_variance_requires_two_values() {
        assert_eq!(
            variance(&[3.0]),
            Err(MetricsError::InsufficientData { required: 2, actual: 1 })
        );
        assert_eq!(population_variance(&[3.0]), Ok(0.0));
    }
}
