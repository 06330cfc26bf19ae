//! Capital gains calculator

use super::{check_date, parse_date};
use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use serde::{Deserialize, Serialize};
use tally_core::{round_money, round_to, TallyError, ValidationError, Validator};
use tally_finance::{capital_gains, Sale};

pub struct CapitalGainsCalculator;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsInput {
    pub purchase_price: f64,
    pub sale_price: f64,
    /// `YYYY-MM-DD`
    pub purchase_date: String,
    /// `YYYY-MM-DD`
    pub sale_date: String,
    #[serde(default)]
    pub transaction_costs: f64,
    #[serde(default)]
    pub improvements: f64,
    /// Marginal rate, percent
    pub tax_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsOutput {
    pub cost_basis: f64,
    pub net_proceeds: f64,
    pub capital_gain: f64,
    pub holding_days: i64,
    pub holding_years: f64,
    pub long_term: bool,
    pub taxable_gain: f64,
    pub tax_owed: f64,
    pub after_tax_gain: f64,
    pub effective_tax_rate: f64,
    pub annualized_return: Option<f64>,
}

static CAPITAL_GAINS_FIELDS: [FieldMeta; 7] = [
    FieldMeta::required("purchasePrice", "Number", "Price paid"),
    FieldMeta::required("salePrice", "Number", "Price received"),
    FieldMeta::required("purchaseDate", "Date", "YYYY-MM-DD"),
    FieldMeta::required("saleDate", "Date", "YYYY-MM-DD, not before the purchase"),
    FieldMeta::optional("transactionCosts", "Number", "Fees deducted from the proceeds", "0"),
    FieldMeta::optional("improvements", "Number", "Added to the cost basis", "0"),
    FieldMeta::required("taxRate", "Number", "Marginal tax rate, percent"),
];

static CAPITAL_GAINS_EXAMPLES: [&str; 1] = [
    r#"{"purchasePrice": 10000, "salePrice": 15000, "purchaseDate": "2020-01-15", "saleDate": "2023-01-15", "taxRate": 20}"#,
];

static CAPITAL_GAINS_RELATED: [&str; 0] = [];

impl Calculator for CapitalGainsCalculator {
    type Input = CapitalGainsInput;
    type Output = CapitalGainsOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "capital_gains",
            description: "Gain, holding period and tax on the sale of an asset",
            fields: &CAPITAL_GAINS_FIELDS,
            examples: &CAPITAL_GAINS_EXAMPLES,
            category: "finance/tax",
            related: &CAPITAL_GAINS_RELATED,
        }
    }

    fn validate(&self, input: &CapitalGainsInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        v.positive("purchasePrice", input.purchase_price)
            .non_negative("salePrice", input.sale_price)
            .non_negative("transactionCosts", input.transaction_costs)
            .non_negative("improvements", input.improvements)
            .range("taxRate", input.tax_rate, 0.0, 100.0);

        let purchase = check_date(&mut v, "purchaseDate", &input.purchase_date);
        let sale = check_date(&mut v, "saleDate", &input.sale_date);
        if let (Some(purchase), Some(sale)) = (purchase, sale) {
            if sale < purchase {
                v.push(ValidationError::DateOrder {
                    field: "saleDate",
                    earlier: "purchaseDate",
                });
            }
        }
        v.finish()
    }

    fn calculate(&self, input: &CapitalGainsInput, _ctx: &EvalContext) -> Result<CapitalGainsOutput, TallyError> {
        let sale = Sale {
            purchase_price: input.purchase_price,
            sale_price: input.sale_price,
            purchase_date: parse_date("purchaseDate", &input.purchase_date)?,
            sale_date: parse_date("saleDate", &input.sale_date)?,
            transaction_costs: input.transaction_costs,
            improvements: input.improvements,
            tax_rate: input.tax_rate,
        };
        let g = capital_gains(&sale)?;

        Ok(CapitalGainsOutput {
            cost_basis: round_money(g.cost_basis),
            net_proceeds: round_money(g.net_proceeds),
            capital_gain: round_money(g.capital_gain),
            holding_days: g.holding_days,
            holding_years: round_to(g.holding_years, 2),
            long_term: g.long_term,
            taxable_gain: round_money(g.taxable_gain),
            tax_owed: round_money(g.tax),
            after_tax_gain: round_money(g.after_tax_gain),
            effective_tax_rate: round_to(g.effective_tax_rate, 2),
            annualized_return: g.annualized_return.map(|r| round_to(r, 2)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CapitalGainsInput {
        CapitalGainsInput {
            purchase_price: 10_000.0,
            sale_price: 15_000.0,
            purchase_date: "2020-01-15".to_string(),
            sale_date: "2023-01-15".to_string(),
            transaction_costs: 100.0,
            improvements: 900.0,
            tax_rate: 20.0,
        }
    }

    #[test]
    fn test_long_term_sale() {
        let out = CapitalGainsCalculator.evaluate(&input(), &EvalContext::default()).unwrap();
        assert_eq!(out.capital_gain, 4000.0);
        assert!(out.long_term);
        assert_eq!(out.taxable_gain, 2000.0);
        assert_eq!(out.tax_owed, 400.0);
        assert_eq!(out.after_tax_gain, 3600.0);
        assert_eq!(out.holding_days, 1096);
        assert_eq!(out.holding_years, 3.0);
        assert_eq!(out.annualized_return, Some(10.98));
    }

    #[test]
    fn test_sale_before_purchase() {
        let mut i = input();
        i.sale_date = "2019-06-30".to_string();
        let err = CapitalGainsCalculator.evaluate(&i, &EvalContext::default()).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("saleDate"));
        assert_eq!(err.message, "saleDate cannot be before purchaseDate");
    }

    #[test]
    fn test_malformed_date() {
        let mut i = input();
        i.purchase_date = "Jan 15 2020".to_string();
        let err = CapitalGainsCalculator.evaluate(&i, &EvalContext::default()).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "purchaseDate");
    }
}
