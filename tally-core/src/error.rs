//! Structured errors
//!
//! Engine functions fail with a named [`MetricsError`]. The calculator layer
//! lifts those into [`TallyError`], a serializable record the UI layer can
//! show next to the offending field.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const LENGTH_MISMATCH: &str = "LENGTH_MISMATCH";
    pub const NON_FINITE: &str = "NON_FINITE";
    pub const NON_POSITIVE: &str = "NON_POSITIVE";
    pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const VALIDATION: &str = "VALIDATION";
    pub const UNKNOWN_CALCULATOR: &str = "UNKNOWN_CALCULATOR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Precondition violations raised by the numeric engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("insufficient data: need at least {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    #[error("value at index {index} must be strictly positive")]
    NonPositive { index: usize },

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid date: {0}")]
    InvalidDate(String),
}

impl MetricsError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    pub fn out_of_range(name: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange { name, value, min, max }
    }

    /// Machine-readable code for this condition
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => codes::INSUFFICIENT_DATA,
            Self::LengthMismatch { .. } => codes::LENGTH_MISMATCH,
            Self::NonFinite { .. } => codes::NON_FINITE,
            Self::NonPositive { .. } => codes::NON_POSITIVE,
            Self::OutOfRange { .. } => codes::OUT_OF_RANGE,
            Self::InvalidDate(_) => codes::INVALID_DATE,
        }
    }
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Calculation failed for this request
    Error,
    /// Nothing could be evaluated
    Fatal,
}

/// Structured error surfaced to callers of the calculator layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Input field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Per-field validation failures
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<Violation>,

    /// Severity level
    pub severity: Severity,
}

/// Serializable form of a single [`ValidationError`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for Violation {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field().to_string(),
            message: err.message(),
        }
    }
}

impl TallyError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            field: None,
            violations: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    // ========== Common Error Constructors ==========

    /// Collapse per-field validation failures into one error
    pub fn validation(errors: &[ValidationError]) -> Self {
        let message = match errors {
            [] => "Invalid input".to_string(),
            [only] => only.message(),
            many => format!("{} invalid fields", many.len()),
        };
        let mut err = Self::new(codes::VALIDATION, message)
            .with_suggestion("Correct the highlighted fields and try again");
        if let [only] = errors {
            err.field = Some(only.field().to_string());
        }
        err.violations = errors.iter().map(Violation::from).collect();
        err
    }

    pub fn unknown_calculator(name: &str) -> Self {
        Self::new(
            codes::UNKNOWN_CALCULATOR,
            format!("Unknown calculator: {}", name),
        )
        .with_suggestion("Send {\"calculator\": \"list\"} to see available calculators")
    }

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Check the request JSON")
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TallyError {}

impl From<MetricsError> for TallyError {
    fn from(err: MetricsError) -> Self {
        let suggestion = match &err {
            MetricsError::InsufficientData { .. } => "Provide more data points",
            MetricsError::LengthMismatch { .. } => "Both series must cover the same periods",
            MetricsError::NonFinite { .. } => "Remove blank or non-numeric entries",
            MetricsError::NonPositive { .. } => "Values must be greater than zero",
            MetricsError::OutOfRange { .. } => "Adjust the value into the allowed range",
            MetricsError::InvalidDate(_) => "Use ISO 8601 dates (YYYY-MM-DD)",
        };
        Self::new(err.code(), err.to_string()).with_suggestion(suggestion)
    }
}
