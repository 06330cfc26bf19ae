//! Central tendency: arithmetic mean

use crate::helpers::{require_min_count, sum};
use tally_core::MetricsError;

/// Arithmetic mean; fails on an empty slice
pub fn mean(numbers: &[f64]) -> Result<f64, MetricsError> {
    require_min_count(numbers, 1)?;
    Ok(sum(numbers) / numbers.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), Ok(4.0));
        assert_eq!(mean(&[-1.5]), Ok(-1.5));
    }

    #[test]
    fn test_mean_empty_is_error() {
        assert_eq!(
            mean(&[]),
            Err(MetricsError::InsufficientData { required: 1, actual: 0 })
        );
    }
}
