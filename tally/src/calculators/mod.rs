//! Built-in calculators and name-based dispatch

mod beta;
mod calmar;
mod loan;
mod early_payoff;
mod refinance;
mod capital_gains;
mod mortgage_equity;
mod rent_vs_buy;

pub use beta::{Beta, BetaInput, BetaOutput};
pub use calmar::{Calmar, CalmarInput, CalmarOutput};
pub use loan::{Loan, LoanInput, LoanOutput};
pub use early_payoff::{EarlyPayoffCalculator, EarlyPayoffInput, EarlyPayoffOutput};
pub use refinance::{Refinance, RefinanceInput, RefinanceOutput};
pub use capital_gains::{CapitalGainsCalculator, CapitalGainsInput, CapitalGainsOutput};
pub use mortgage_equity::{CashOutInput, MortgageEquity, MortgageEquityInput, MortgageEquityOutput};
pub use rent_vs_buy::{RentVsBuyCalculator, RentVsBuyInput, RentVsBuyOutput};

use crate::{Calculator, CalculatorMeta, EvalContext};
use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use tally_core::{TallyError, ValidationError, Validator};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Metadata for every built-in calculator, in a stable order
pub fn catalog() -> Vec<CalculatorMeta> {
    vec![
        Beta.meta(),
        Calmar.meta(),
        Loan.meta(),
        EarlyPayoffCalculator.meta(),
        Refinance.meta(),
        CapitalGainsCalculator.meta(),
        MortgageEquity.meta(),
        RentVsBuyCalculator.meta(),
    ]
}

/// Decode `inputs`, run the named calculator and encode its output
pub fn evaluate(name: &str, inputs: JsonValue, ctx: &EvalContext) -> Result<JsonValue, TallyError> {
    match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "beta" => run(&Beta, inputs, ctx),
        "calmar" => run(&Calmar, inputs, ctx),
        "loan" => run(&Loan, inputs, ctx),
        "early_payoff" => run(&EarlyPayoffCalculator, inputs, ctx),
        "refinance" => run(&Refinance, inputs, ctx),
        "capital_gains" => run(&CapitalGainsCalculator, inputs, ctx),
        "mortgage_equity" => run(&MortgageEquity, inputs, ctx),
        "rent_vs_buy" => run(&RentVsBuyCalculator, inputs, ctx),
        _ => Err(TallyError::unknown_calculator(name)),
    }
}

fn run<C: Calculator>(calculator: &C, inputs: JsonValue, ctx: &EvalContext) -> Result<JsonValue, TallyError> {
    let input: C::Input = serde_json::from_value(inputs)
        .map_err(|e| TallyError::parse_error(e.to_string()))?;
    let output = calculator.evaluate(&input, ctx)?;
    tracing::debug!(calculator = calculator.meta().name, "evaluated");
    serde_json::to_value(output).map_err(|e| TallyError::internal(e.to_string()))
}

/// Parse a `YYYY-MM-DD` field, recording a failure on the validator
pub(crate) fn check_date(v: &mut Validator, field: &'static str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            v.push(ValidationError::InvalidDate {
                field,
                value: raw.to_string(),
            });
            None
        }
    }
}

/// Parse a date that validation already accepted
pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, TallyError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        TallyError::validation(&[ValidationError::InvalidDate {
            field,
            value: raw.to_string(),
        }])
    })
}
