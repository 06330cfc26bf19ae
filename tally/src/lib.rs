//! Tally Calculator Layer
//!
//! Each calculator validates a raw input record field by field, runs the
//! finance engine and presents the result with money rounded to cents.
//! [`calculators::evaluate`] dispatches by name for JSON callers.

mod traits;
mod context;
pub mod calculators;

pub use traits::{Calculator, CalculatorMeta, FieldMeta};
pub use context::{EvalContext, ENV_DISCOUNT_RATE, ENV_MAX_SCHEDULE_PERIODS};

/// Re-export core types for calculator callers
pub mod prelude {
    pub use crate::calculators::{catalog, evaluate};
    pub use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
    pub use tally_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::calculators::{catalog, evaluate};
    use super::EvalContext;
    use serde_json::json;

    #[test]
    fn test_catalog_names() {
        let names: Vec<&str> = catalog().iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec![
                "beta",
                "calmar",
                "loan",
                "early_payoff",
                "refinance",
                "capital_gains",
                "mortgage_equity",
                "rent_vs_buy"
            ]
        );
    }

    #[test]
    fn test_evaluate_by_name() {
        let result = evaluate(
            "Early-Payoff",
            json!({"principal": 25000, "annualRate": 8.5, "termYears": 5, "extraPayment": 100}),
            &EvalContext::default(),
        )
        .unwrap();
        assert_eq!(result["originalTerm"], 60);
        assert!(result["newTerm"].as_u64().unwrap() < 60);
        assert!(result["totalSavings"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_evaluate_unknown_calculator() {
        let err = evaluate("mortgage", json!({}), &EvalContext::default()).unwrap_err();
        assert_eq!(err.code, "UNKNOWN_CALCULATOR");
    }

    #[test]
    fn test_evaluate_bad_shape() {
        let err = evaluate("loan", json!({"principal": "lots"}), &EvalContext::default()).unwrap_err();
        assert_eq!(err.code, "PARSE_ERROR");
    }
}
