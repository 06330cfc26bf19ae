//! Refinance calculator

use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use serde::{Deserialize, Serialize};
use tally_core::{round_money, round_to, TallyError, ValidationError, Validator};
use tally_finance::{analyze_refinance_with_discount, RefinanceTerms, MAX_ANNUAL_RATE, MAX_TERM_YEARS};

pub struct Refinance;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceInput {
    pub current_balance: f64,
    pub current_rate: f64,
    pub months_remaining: u32,
    pub new_rate: f64,
    pub new_term_years: u32,
    #[serde(default)]
    pub closing_costs: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceOutput {
    pub current_monthly_payment: f64,
    pub new_monthly_payment: f64,
    pub monthly_savings: f64,
    /// Absent when the new loan costs more each month
    pub break_even_months: Option<f64>,
    pub break_even_years: Option<f64>,
    pub first_year_savings: f64,
    pub five_year_savings: f64,
    pub total_cost_savings: f64,
    pub net_present_value: f64,
    pub discount_rate: f64,
    pub worthwhile: bool,
}

static REFINANCE_FIELDS: [FieldMeta; 6] = [
    FieldMeta::required("currentBalance", "Number", "Outstanding balance of the current loan"),
    FieldMeta::required("currentRate", "Number", "Current annual rate, percent"),
    FieldMeta::required("monthsRemaining", "Number", "Payments left on the current loan"),
    FieldMeta::required("newRate", "Number", "New annual rate, percent"),
    FieldMeta::required("newTermYears", "Number", "Term of the new loan in years"),
    FieldMeta::optional("closingCosts", "Number", "Up-front cost of refinancing", "0"),
];

static REFINANCE_EXAMPLES: [&str; 1] = [
    r#"{"currentBalance": 300000, "currentRate": 7, "monthsRemaining": 360, "newRate": 5.5, "newTermYears": 30, "closingCosts": 6000}"#,
];

static REFINANCE_RELATED: [&str; 1] = ["loan"];

impl Calculator for Refinance {
    type Input = RefinanceInput;
    type Output = RefinanceOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "refinance",
            description: "Monthly savings, break-even and NPV of refinancing a loan",
            fields: &REFINANCE_FIELDS,
            examples: &REFINANCE_EXAMPLES,
            category: "finance/loans",
            related: &REFINANCE_RELATED,
        }
    }

    fn validate(&self, input: &RefinanceInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        v.positive("currentBalance", input.current_balance)
            .range("currentRate", input.current_rate, 0.0, MAX_ANNUAL_RATE)
            .positive_up_to(
                "monthsRemaining",
                f64::from(input.months_remaining),
                f64::from(MAX_TERM_YEARS * 12),
            )
            .range("newRate", input.new_rate, 0.0, MAX_ANNUAL_RATE)
            .positive_up_to("newTermYears", f64::from(input.new_term_years), f64::from(MAX_TERM_YEARS))
            .non_negative("closingCosts", input.closing_costs);
        v.finish()
    }

    fn calculate(&self, input: &RefinanceInput, ctx: &EvalContext) -> Result<RefinanceOutput, TallyError> {
        let terms = RefinanceTerms {
            current_balance: input.current_balance,
            current_rate: input.current_rate,
            months_remaining: input.months_remaining,
            new_rate: input.new_rate,
            new_term_years: input.new_term_years,
            closing_costs: input.closing_costs,
        };
        let a = analyze_refinance_with_discount(&terms, ctx.refinance_discount_rate)?;

        Ok(RefinanceOutput {
            current_monthly_payment: round_money(a.current_payment),
            new_monthly_payment: round_money(a.new_payment),
            monthly_savings: round_money(a.monthly_savings),
            break_even_months: a.break_even_months.map(|m| round_to(m, 2)),
            break_even_years: a.break_even_months.map(|m| round_to(m / 12.0, 2)),
            first_year_savings: round_money(a.first_year_savings),
            five_year_savings: round_money(a.five_year_savings),
            total_cost_savings: round_money(a.total_cost_savings),
            net_present_value: round_money(a.net_present_value),
            discount_rate: ctx.refinance_discount_rate,
            worthwhile: a.is_worthwhile(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RefinanceInput {
        RefinanceInput {
            current_balance: 300_000.0,
            current_rate: 7.0,
            months_remaining: 360,
            new_rate: 5.5,
            new_term_years: 30,
            closing_costs: 6_000.0,
        }
    }

    #[test]
    fn test_refinance_saves() {
        let out = Refinance.evaluate(&input(), &EvalContext::default()).unwrap();
        assert_eq!(out.current_monthly_payment, 1995.91);
        assert_eq!(out.new_monthly_payment, 1703.37);
        assert_eq!(out.monthly_savings, 292.54);
        assert_eq!(out.break_even_months, Some(20.51));
        assert_eq!(out.discount_rate, 5.0);
        assert!(out.worthwhile);
    }

    #[test]
    fn test_discount_rate_from_context() {
        let low = Refinance
            .evaluate(&input(), &EvalContext::new().with_discount_rate(1.0))
            .unwrap();
        let high = Refinance
            .evaluate(&input(), &EvalContext::new().with_discount_rate(10.0))
            .unwrap();
        assert!(low.net_present_value > high.net_present_value);
    }

    #[test]
    fn test_break_even_absent_when_rate_rises() {
        let mut i = input();
        i.new_rate = 9.0;
        let out = Refinance.evaluate(&i, &EvalContext::default()).unwrap();
        assert_eq!(out.break_even_months, None);
        assert!(!out.worthwhile);
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["breakEvenMonths"].is_null());
    }

    #[test]
    fn test_oversized_terms_are_rejected() {
        let mut i = input();
        i.months_remaining = u32::MAX;
        i.new_term_years = u32::MAX;
        let err = Refinance.evaluate(&i, &EvalContext::default()).unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["monthsRemaining", "newTermYears"]);
    }

    #[test]
    fn test_validation() {
        let mut i = input();
        i.months_remaining = 0;
        i.closing_costs = -1.0;
        let err = Refinance.evaluate(&i, &EvalContext::default()).unwrap_err();
        assert_eq!(err.violations.len(), 2);
    }
}
