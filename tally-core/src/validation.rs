//! Field-level input validation
//!
//! Calculators check raw inputs before anything reaches the engine. Each
//! failure names the field it belongs to; message text is derived from the
//! variant so the numeric code never carries presentation strings.

use std::fmt;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Required {
        field: &'static str,
    },
    NotFinite {
        field: &'static str,
    },
    MustBePositive {
        field: &'static str,
        value: f64,
    },
    Negative {
        field: &'static str,
        value: f64,
    },
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// `field` must stay strictly below the value of `limit_field`
    ExceedsLimit {
        field: &'static str,
        value: f64,
        limit_field: &'static str,
        limit: f64,
    },
    TooFewPoints {
        field: &'static str,
        required: usize,
        actual: usize,
    },
    LengthMismatch {
        field: &'static str,
        other: &'static str,
        left: usize,
        right: usize,
    },
    InvalidDate {
        field: &'static str,
        value: String,
    },
    /// `field` must not come before `earlier`
    DateOrder {
        field: &'static str,
        earlier: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::NotFinite { field }
            | Self::MustBePositive { field, .. }
            | Self::Negative { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::ExceedsLimit { field, .. }
            | Self::TooFewPoints { field, .. }
            | Self::LengthMismatch { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::DateOrder { field, .. } => field,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Required { field } => format!("{} is required", field),
            Self::NotFinite { field } => format!("{} must be a finite number", field),
            Self::MustBePositive { field, value } => {
                format!("{} must be greater than 0, got {}", field, value)
            }
            Self::Negative { field, value } => {
                format!("{} cannot be negative, got {}", field, value)
            }
            Self::OutOfRange { field, value, min, max } => {
                format!("{} must be between {} and {}, got {}", field, min, max, value)
            }
            Self::ExceedsLimit { field, value, limit_field, limit } => format!(
                "{} ({}) must be less than {} ({})",
                field, value, limit_field, limit
            ),
            Self::TooFewPoints { field, required, actual } => format!(
                "{} needs at least {} values, got {}",
                field, required, actual
            ),
            Self::LengthMismatch { field, other, left, right } => format!(
                "{} and {} must have the same length ({} vs {})",
                field, other, left, right
            ),
            Self::InvalidDate { field, value } => {
                format!("{} is not a valid date: '{}'", field, value)
            }
            Self::DateOrder { field, earlier } => {
                format!("{} cannot be before {}", field, earlier)
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates every failure instead of stopping at the first one
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Returns false (and records the failure) for NaN or infinity
    fn finite(&mut self, field: &'static str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            self.errors.push(ValidationError::NotFinite { field });
            false
        }
    }

    pub fn positive(&mut self, field: &'static str, value: f64) -> &mut Self {
        if self.finite(field, value) && value <= 0.0 {
            self.errors.push(ValidationError::MustBePositive { field, value });
        }
        self
    }

    /// Strictly positive and no larger than `max`
    pub fn positive_up_to(&mut self, field: &'static str, value: f64, max: f64) -> &mut Self {
        if !self.finite(field, value) {
            return self;
        }
        if value <= 0.0 {
            self.errors.push(ValidationError::MustBePositive { field, value });
        } else if value > max {
            self.errors.push(ValidationError::OutOfRange { field, value, min: 0.0, max });
        }
        self
    }

    pub fn non_negative(&mut self, field: &'static str, value: f64) -> &mut Self {
        if self.finite(field, value) && value < 0.0 {
            self.errors.push(ValidationError::Negative { field, value });
        }
        self
    }

    pub fn range(&mut self, field: &'static str, value: f64, min: f64, max: f64) -> &mut Self {
        if self.finite(field, value) && (value < min || value > max) {
            self.errors.push(ValidationError::OutOfRange { field, value, min, max });
        }
        self
    }

    pub fn below(
        &mut self,
        field: &'static str,
        value: f64,
        limit_field: &'static str,
        limit: f64,
    ) -> &mut Self {
        if value.is_finite() && limit.is_finite() && value >= limit {
            self.errors.push(ValidationError::ExceedsLimit {
                field,
                value,
                limit_field,
                limit,
            });
        }
        self
    }

    /// Minimum length plus every element finite
    pub fn series(&mut self, field: &'static str, values: &[f64], min_len: usize) -> &mut Self {
        if values.len() < min_len {
            self.errors.push(ValidationError::TooFewPoints {
                field,
                required: min_len,
                actual: values.len(),
            });
        } else if values.iter().any(|v| !v.is_finite()) {
            self.errors.push(ValidationError::NotFinite { field });
        }
        self
    }

    /// Like [`Validator::series`], and every element strictly positive
    pub fn positive_series(
        &mut self,
        field: &'static str,
        values: &[f64],
        min_len: usize,
    ) -> &mut Self {
        let before = self.errors.len();
        self.series(field, values, min_len);
        if self.errors.len() == before {
            if let Some(&value) = values.iter().find(|v| **v <= 0.0) {
                self.errors.push(ValidationError::MustBePositive { field, value });
            }
        }
        self
    }

    pub fn same_length(
        &mut self,
        field: &'static str,
        left: &[f64],
        other: &'static str,
        right: &[f64],
    ) -> &mut Self {
        if left.len() != right.len() {
            self.errors.push(ValidationError::LengthMismatch {
                field,
                other,
                left: left.len(),
                right: right.len(),
            });
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_failures() {
        let mut v = Validator::new();
        v.positive("loanAmount", 0.0)
            .range("interestRate", 75.0, 0.0, 50.0)
            .non_negative("extraPayment", 10.0);
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field(), "loanAmount");
        assert_eq!(errors[1].field(), "interestRate");
    }

    #[test]
    fn test_nan_reported_as_not_finite() {
        let mut v = Validator::new();
        v.positive("loanAmount", f64::NAN);
        assert_eq!(
            v.errors(),
            &[ValidationError::NotFinite { field: "loanAmount" }]
        );
    }

    #[test]
    fn test_series_checks() {
        let mut v = Validator::new();
        v.series("returns", &[1.0], 2)
            .positive_series("values", &[100.0, 0.0, 120.0], 2)
            .same_length("returns", &[1.0, 2.0], "market", &[1.0]);
        let fields: Vec<_> = v.errors().iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["returns", "values", "returns"]);
        assert!(matches!(v.errors()[0], ValidationError::TooFewPoints { required: 2, actual: 1, .. }));
    }

    #[test]
    fn test_positive_up_to() {
        let mut v = Validator::new();
        v.positive_up_to("termYears", 30.0, 100.0)
            .positive_up_to("termYears", 1e9, 100.0)
            .positive_up_to("monthsRemaining", 0.0, 1200.0);
        assert_eq!(
            v.errors(),
            &[
                ValidationError::OutOfRange { field: "termYears", value: 1e9, min: 0.0, max: 100.0 },
                ValidationError::MustBePositive { field: "monthsRemaining", value: 0.0 },
            ]
        );
    }

    #[test]
    fn test_below_limit() {
        let mut v = Validator::new();
        v.below("extraPayment", 500.0, "loanAmount", 400.0);
        let msg = v.errors()[0].message();
        assert!(msg.contains("extraPayment"));
        assert!(msg.contains("loanAmount"));
    }

    #[test]
    fn test_valid_input_passes() {
        let mut v = Validator::new();
        v.positive("a", 1.0).range("b", 5.0, 0.0, 10.0);
        assert!(v.is_valid());
        assert!(v.finish().is_ok());
    }
}
