//! Early payoff calculator: what an extra payment per period saves

use super::loan::{rounded_summary, validate_loan_fields};
use super::parse_date;
use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{round_money, round_to, PaymentFrequency, TallyError, ValidationError, Validator};
use tally_finance::{early_payoff_analysis_with_cap, project_payoff_date, LoanSummary, LoanTerms};

pub struct EarlyPayoffCalculator;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyPayoffInput {
    pub principal: f64,
    /// Annual, percent
    pub annual_rate: f64,
    pub term_years: f64,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    pub extra_payment: f64,
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyPayoffOutput {
    /// Payments without the extra amount
    pub original_term: usize,
    /// Payments with the extra amount
    pub new_term: usize,
    pub periods_saved: usize,
    pub years_saved: f64,
    /// Interest avoided by paying early
    pub total_savings: f64,
    pub original: LoanSummary,
    pub accelerated: LoanSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_payoff_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_payoff_date: Option<NaiveDate>,
}

static EARLY_PAYOFF_FIELDS: [FieldMeta; 6] = [
    FieldMeta::required("principal", "Number", "Amount borrowed"),
    FieldMeta::required("annualRate", "Number", "Annual interest rate, percent (0-50)"),
    FieldMeta::required("termYears", "Number", "Loan term in years"),
    FieldMeta::optional("frequency", "Text", "Payment frequency", "monthly"),
    FieldMeta::required("extraPayment", "Number", "Extra amount paid every period"),
    FieldMeta::optional("startDate", "Date", "Loan start, YYYY-MM-DD", "none"),
];

static EARLY_PAYOFF_EXAMPLES: [&str; 1] =
    [r#"{"principal": 200000, "annualRate": 6, "termYears": 30, "extraPayment": 200}"#];

static EARLY_PAYOFF_RELATED: [&str; 1] = ["loan"];

impl Calculator for EarlyPayoffCalculator {
    type Input = EarlyPayoffInput;
    type Output = EarlyPayoffOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "early_payoff",
            description: "Compare a loan with and without an extra payment every period",
            fields: &EARLY_PAYOFF_FIELDS,
            examples: &EARLY_PAYOFF_EXAMPLES,
            category: "finance/loans",
            related: &EARLY_PAYOFF_RELATED,
        }
    }

    fn validate(&self, input: &EarlyPayoffInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        validate_loan_fields(
            &mut v,
            input.principal,
            input.annual_rate,
            Some(input.term_years),
            None,
            input.frequency,
            input.start_date.as_deref(),
        );
        v.positive("extraPayment", input.extra_payment)
            .below("extraPayment", input.extra_payment, "principal", input.principal);
        v.finish()
    }

    fn calculate(&self, input: &EarlyPayoffInput, ctx: &EvalContext) -> Result<EarlyPayoffOutput, TallyError> {
        let terms = LoanTerms::new(input.principal, input.annual_rate, input.term_years, input.frequency)
            .with_extra_payment(input.extra_payment);
        let payoff = early_payoff_analysis_with_cap(&terms, ctx.max_schedule_periods)?;

        let (original_payoff_date, new_payoff_date) = match input.start_date.as_deref() {
            Some(raw) => {
                let start = parse_date("startDate", raw)?;
                let original = project_payoff_date(start, terms.frequency, payoff.baseline.number_of_payments as u32)?;
                let accelerated =
                    project_payoff_date(start, terms.frequency, payoff.accelerated.number_of_payments as u32)?;
                (Some(original), Some(accelerated))
            }
            None => (None, None),
        };

        Ok(EarlyPayoffOutput {
            original_term: payoff.baseline.number_of_payments,
            new_term: payoff.accelerated.number_of_payments,
            periods_saved: payoff.periods_saved,
            years_saved: round_to(payoff.years_saved, 2),
            total_savings: round_money(payoff.interest_saved),
            original: rounded_summary(&payoff.baseline),
            accelerated: rounded_summary(&payoff.accelerated),
            original_payoff_date,
            new_payoff_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(extra: f64) -> EarlyPayoffInput {
        EarlyPayoffInput {
            principal: 200_000.0,
            annual_rate: 6.0,
            term_years: 30.0,
            frequency: PaymentFrequency::Monthly,
            extra_payment: extra,
            start_date: Some("2024-01-01".to_string()),
        }
    }

    #[test]
    fn test_extra_payment_shortens_term() {
        let out = EarlyPayoffCalculator.evaluate(&input(200.0), &EvalContext::default()).unwrap();
        assert_eq!(out.original_term, 360);
        assert!(out.new_term < out.original_term);
        assert!(out.total_savings > 0.0);
        assert_eq!(out.periods_saved, out.original_term - out.new_term);
        assert_eq!(out.original_payoff_date, NaiveDate::from_ymd_opt(2054, 1, 1));
        assert!(out.new_payoff_date < out.original_payoff_date);
        assert_eq!(out.original.payment, 1199.10);
    }

    #[test]
    fn test_cent_extra_saves_interest_only() {
        let mut i = input(0.01);
        i.principal = 25_000.0;
        i.annual_rate = 8.5;
        i.term_years = 5.0;
        let out = EarlyPayoffCalculator.evaluate(&i, &EvalContext::default()).unwrap();
        assert_eq!(out.original_term, 60);
        assert_eq!(out.new_term, 60);
        assert!(out.total_savings > 0.0);
    }

    #[test]
    fn test_zero_extra_is_rejected() {
        let err = EarlyPayoffCalculator
            .evaluate(&input(0.0), &EvalContext::default())
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("extraPayment"));
    }
}
