//! Beta calculator: stock returns against market returns

use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use serde::{Deserialize, Serialize};
use tally_core::{Period, TallyError, ValidationError, Validator};
use tally_finance::{assess_risk, risk_metrics, Assessment, RiskMetrics};

pub struct Beta;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaInput {
    pub stock_returns: Vec<f64>,
    pub market_returns: Vec<f64>,
    /// Annual, percent
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub period: Period,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaOutput {
    #[serde(flatten)]
    pub metrics: RiskMetrics,
    pub analysis: Assessment,
}

static BETA_FIELDS: [FieldMeta; 4] = [
    FieldMeta::required("stockReturns", "List<Number>", "Period returns of the asset, percent"),
    FieldMeta::required("marketReturns", "List<Number>", "Market returns for the same periods, percent"),
    FieldMeta::optional("riskFreeRate", "Number", "Annual risk-free rate, percent", "0"),
    FieldMeta::optional("period", "Text", "daily, weekly, monthly, quarterly or yearly", "monthly"),
];

static BETA_EXAMPLES: [&str; 1] =
    [r#"{"stockReturns": [2.1, -3.4, 4.2], "marketReturns": [1.2, -2.1, 2.8], "riskFreeRate": 2}"#];

static BETA_RELATED: [&str; 1] = ["calmar"];

const MIN_OBSERVATIONS: usize = 3;

impl Calculator for Beta {
    type Input = BetaInput;
    type Output = BetaOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "beta",
            description: "Beta, alpha and risk-adjusted ratios of an asset against its market",
            fields: &BETA_FIELDS,
            examples: &BETA_EXAMPLES,
            category: "finance/risk",
            related: &BETA_RELATED,
        }
    }

    fn validate(&self, input: &BetaInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        v.series("stockReturns", &input.stock_returns, MIN_OBSERVATIONS)
            .series("marketReturns", &input.market_returns, MIN_OBSERVATIONS)
            .same_length("stockReturns", &input.stock_returns, "marketReturns", &input.market_returns)
            .range("riskFreeRate", input.risk_free_rate, -10.0, 50.0);
        v.finish()
    }

    fn calculate(&self, input: &BetaInput, _ctx: &EvalContext) -> Result<BetaOutput, TallyError> {
        let metrics = risk_metrics(
            &input.stock_returns,
            &input.market_returns,
            input.risk_free_rate,
            input.period,
        )?;
        let analysis = assess_risk(&metrics);
        Ok(BetaOutput { metrics, analysis })
    }
}
