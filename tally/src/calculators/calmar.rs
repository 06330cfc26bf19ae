//! Calmar ratio calculator over portfolio values

use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use serde::{Deserialize, Serialize};
use tally_core::{Period, TallyError, ValidationError, Validator};
use tally_finance::{assess_drawdown, drawdown_metrics, Assessment, DrawdownMetrics};

pub struct Calmar;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalmarInput {
    pub portfolio_values: Vec<f64>,
    #[serde(default)]
    pub period: Period,
    /// Annual, percent
    #[serde(default)]
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalmarOutput {
    #[serde(flatten)]
    pub metrics: DrawdownMetrics,
    pub analysis: Assessment,
}

static CALMAR_FIELDS: [FieldMeta; 3] = [
    FieldMeta::required("portfolioValues", "List<Number>", "Portfolio value at the end of each period"),
    FieldMeta::optional("period", "Text", "Spacing of the values", "monthly"),
    FieldMeta::optional("riskFreeRate", "Number", "Annual risk-free rate, percent", "0"),
];

static CALMAR_EXAMPLES: [&str; 1] =
    [r#"{"portfolioValues": [10000, 10200, 10100, 10300], "period": "monthly", "riskFreeRate": 4.5}"#];

static CALMAR_RELATED: [&str; 1] = ["beta"];

impl Calculator for Calmar {
    type Input = CalmarInput;
    type Output = CalmarOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "calmar",
            description: "Maximum drawdown, CAGR and Calmar ratio of a value series",
            fields: &CALMAR_FIELDS,
            examples: &CALMAR_EXAMPLES,
            category: "finance/risk",
            related: &CALMAR_RELATED,
        }
    }

    fn validate(&self, input: &CalmarInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        v.positive_series("portfolioValues", &input.portfolio_values, 3)
            .range("riskFreeRate", input.risk_free_rate, -10.0, 50.0);
        v.finish()
    }

    fn calculate(&self, input: &CalmarInput, _ctx: &EvalContext) -> Result<CalmarOutput, TallyError> {
        let metrics = drawdown_metrics(&input.portfolio_values, input.period, input.risk_free_rate)?;
        let analysis = assess_drawdown(&metrics);
        Ok(CalmarOutput { metrics, analysis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(values: &[f64]) -> CalmarInput {
        CalmarInput {
            portfolio_values: values.to_vec(),
            period: Period::Monthly,
            risk_free_rate: 4.5,
        }
    }

    #[test]
    fn test_portfolio_with_dips() {
        let values = [
            10000.0, 10200.0, 10100.0, 10300.0, 10250.0, 10400.0, 10350.0, 10500.0, 10600.0,
            10500.0, 10700.0, 10800.0,
        ];
        let out = Calmar.evaluate(&input(&values), &EvalContext::default()).unwrap();
        assert!(out.metrics.max_drawdown > 0.0);
        assert!(out.metrics.calmar_ratio > 0.0);
        assert!(out.metrics.calmar_ratio.is_finite());
    }

    #[test]
    fn test_monotonic_series() {
        let values = [10000.0, 10100.0, 10200.0, 10300.0, 10400.0, 10500.0];
        let out = Calmar.evaluate(&input(&values), &EvalContext::default()).unwrap();
        assert_eq!(out.metrics.max_drawdown, 0.0);
        assert_eq!(out.metrics.calmar_ratio, 0.0);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let err = Calmar
            .evaluate(&input(&[100.0, 0.0, 90.0]), &EvalContext::default())
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("portfolioValues"));
    }

    #[test]
    fn test_rejects_short_series() {
        let err = Calmar
            .evaluate(&input(&[100.0, 90.0]), &EvalContext::default())
            .unwrap_err();
        assert_eq!(err.code, "VALIDATION");
        assert_eq!(err.message, "portfolioValues needs at least 3 values, got 2");
    }
}
