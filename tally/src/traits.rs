//! Calculator trait

use crate::EvalContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tally_core::{TallyError, ValidationError};

/// Metadata about a calculator input field
#[derive(Debug, Clone, Serialize)]
pub struct FieldMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl FieldMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// Metadata for a calculator
#[derive(Debug, Clone, Serialize)]
pub struct CalculatorMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldMeta],
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// A calculator turns one validated input record into one output record
pub trait Calculator: Send + Sync {
    type Input: DeserializeOwned;
    type Output: Serialize;

    fn meta(&self) -> CalculatorMeta;

    /// Check every field, reporting all failures at once
    fn validate(&self, input: &Self::Input) -> Result<(), Vec<ValidationError>>;

    /// Run the engine on an input that already passed [`Calculator::validate`]
    fn calculate(&self, input: &Self::Input, ctx: &EvalContext) -> Result<Self::Output, TallyError>;

    fn evaluate(&self, input: &Self::Input, ctx: &EvalContext) -> Result<Self::Output, TallyError> {
        self.validate(input)
            .map_err(|errors| TallyError::validation(&errors))?;
        self.calculate(input, ctx)
    }
}
