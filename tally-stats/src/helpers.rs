//! Helper functions for statistical operations
//!
//! Cardinality and finiteness guards shared by every primitive.

use tally_core::MetricsError;

/// Require minimum count
pub fn require_min_count(numbers: &[f64], min: usize) -> Result<(), MetricsError> {
    if numbers.len() < min {
        return Err(MetricsError::insufficient(min, numbers.len()));
    }
    Ok(())
}

/// Require two series of equal length
pub fn require_same_length(x: &[f64], y: &[f64]) -> Result<(), MetricsError> {
    if x.len() != y.len() {
        return Err(MetricsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(())
}

/// Require every value to be finite
pub fn require_finite(numbers: &[f64]) -> Result<(), MetricsError> {
    match numbers.iter().position(|n| !n.is_finite()) {
        Some(index) => Err(MetricsError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Equal length, at least `min` pairs, all finite
pub fn require_paired(x: &[f64], y: &[f64], min: usize) -> Result<(), MetricsError> {
    require_same_length(x, y)?;
    require_min_count(x, min)?;
    require_finite(x)?;
    require_finite(y)
}

/// Calculate sum of numbers
pub fn sum(numbers: &[f64]) -> f64 {
    numbers.iter().sum()
}

/// Sum of squared deviations from `center`
pub fn sum_squared_deviations(numbers: &[f64], center: f64) -> f64 {
    numbers
        .iter()
        .map(|x| {
            let dev = x - center;
            dev * dev
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_min_count() {
        assert!(require_min_count(&[1.0, 2.0], 2).is_ok());
        assert_eq!(
            require_min_count(&[1.0], 2),
            Err(MetricsError::InsufficientData { required: 2, actual: 1 })
        );
    }

    #[test]
    fn test_require_paired() {
        assert_eq!(
            require_paired(&[1.0, 2.0], &[1.0], 2),
            Err(MetricsError::LengthMismatch { left: 2, right: 1 })
        );
        assert_eq!(
            require_paired(&[1.0, f64::NAN], &[1.0, 2.0], 2),
            Err(MetricsError::NonFinite { index: 1 })
        );
        assert!(require_paired(&[1.0, 2.0], &[3.0, 4.0], 2).is_ok());
    }

    #[test]
    fn test_sum_squared_deviations() {
        assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(sum_squared_deviations(&[1.0, 2.0, 3.0], 2.0), 2.0);
    }
}
