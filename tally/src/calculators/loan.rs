//! Loan calculator: payment, totals and the amortization schedule

use super::{check_date, parse_date};
use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{round_money, PaymentFrequency, TallyError, ValidationError, Validator};
use tally_finance::{
    generate_schedule_with_cap, max_term_periods, project_payoff_date, AmortizationEntry,
    LoanSummary, LoanTerms, MAX_ANNUAL_RATE, MAX_TERM_YEARS,
};

pub struct Loan;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInput {
    pub principal: f64,
    /// Annual, percent
    pub annual_rate: f64,
    /// Either `termYears` or `numberOfPayments` must be given
    #[serde(default)]
    pub term_years: Option<f64>,
    #[serde(default)]
    pub number_of_payments: Option<u32>,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub extra_payment: f64,
    /// `YYYY-MM-DD`; enables the payoff date
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default = "default_true")]
    pub include_schedule: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOutput {
    pub payment: f64,
    pub number_of_payments: usize,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<AmortizationEntry>>,
}

static LOAN_FIELDS: [FieldMeta; 8] = [
    FieldMeta::required("principal", "Number", "Amount borrowed"),
    FieldMeta::required("annualRate", "Number", "Annual interest rate, percent (0-50)"),
    FieldMeta::optional("termYears", "Number", "Loan term in years (at most 100)", "none"),
    FieldMeta::optional("numberOfPayments", "Number", "Loan term as a payment count (at most 100 years)", "none"),
    FieldMeta::optional("frequency", "Text", "weekly, bi-weekly, monthly, quarterly, semi-annually, annually", "monthly"),
    FieldMeta::optional("extraPayment", "Number", "Added to every payment", "0"),
    FieldMeta::optional("startDate", "Date", "Loan start, YYYY-MM-DD", "none"),
    FieldMeta::optional("includeSchedule", "Bool", "Return every schedule row", "true"),
];

static LOAN_EXAMPLES: [&str; 1] =
    [r#"{"principal": 25000, "annualRate": 8.5, "termYears": 5, "frequency": "monthly"}"#];

static LOAN_RELATED: [&str; 2] = ["early_payoff", "refinance"];

/// Schedule row rounded to cents
pub(crate) fn rounded_entry(e: &AmortizationEntry) -> AmortizationEntry {
    AmortizationEntry {
        period: e.period,
        payment: round_money(e.payment),
        principal: round_money(e.principal),
        interest: round_money(e.interest),
        beginning_balance: round_money(e.beginning_balance),
        ending_balance: round_money(e.ending_balance),
        cumulative_interest: round_money(e.cumulative_interest),
    }
}

/// Summary rounded to cents
pub(crate) fn rounded_summary(s: &LoanSummary) -> LoanSummary {
    LoanSummary {
        payment: round_money(s.payment),
        number_of_payments: s.number_of_payments,
        total_interest: round_money(s.total_interest),
        total_paid: round_money(s.total_paid),
        final_balance: round_money(s.final_balance),
    }
}

impl LoanInput {
    pub(crate) fn terms(&self) -> Result<LoanTerms, TallyError> {
        let terms = match (self.number_of_payments, self.term_years) {
            (Some(n), _) => LoanTerms::with_periods(self.principal, self.annual_rate, n, self.frequency),
            (None, Some(years)) => LoanTerms::new(self.principal, self.annual_rate, years, self.frequency),
            (None, None) => {
                return Err(TallyError::validation(&[ValidationError::Required { field: "termYears" }]))
            }
        };
        Ok(terms.with_extra_payment(self.extra_payment))
    }
}

/// Field checks shared with the early payoff calculator
pub(crate) fn validate_loan_fields(
    v: &mut Validator,
    principal: f64,
    annual_rate: f64,
    term_years: Option<f64>,
    number_of_payments: Option<u32>,
    frequency: PaymentFrequency,
    start_date: Option<&str>,
) {
    v.positive("principal", principal)
        .range("annualRate", annual_rate, 0.0, MAX_ANNUAL_RATE);
    match (number_of_payments, term_years) {
        (Some(n), _) => {
            v.positive_up_to("numberOfPayments", f64::from(n), f64::from(max_term_periods(frequency)));
        }
        (None, Some(years)) => {
            v.positive_up_to("termYears", years, f64::from(MAX_TERM_YEARS));
        }
        (None, None) => {
            v.push(ValidationError::Required { field: "termYears" });
        }
    }
    if let Some(raw) = start_date {
        check_date(v, "startDate", raw);
    }
}

impl Calculator for Loan {
    type Input = LoanInput;
    type Output = LoanOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "loan",
            description: "Periodic payment, total interest and amortization schedule",
            fields: &LOAN_FIELDS,
            examples: &LOAN_EXAMPLES,
            category: "finance/loans",
            related: &LOAN_RELATED,
        }
    }

    fn validate(&self, input: &LoanInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        validate_loan_fields(
            &mut v,
            input.principal,
            input.annual_rate,
            input.term_years,
            input.number_of_payments,
            input.frequency,
            input.start_date.as_deref(),
        );
        v.non_negative("extraPayment", input.extra_payment)
            .below("extraPayment", input.extra_payment, "principal", input.principal);
        v.finish()
    }

    fn calculate(&self, input: &LoanInput, ctx: &EvalContext) -> Result<LoanOutput, TallyError> {
        let terms = input.terms()?;
        let schedule = generate_schedule_with_cap(&terms, ctx.max_schedule_periods)?;

        let payoff_date = match input.start_date.as_deref() {
            Some(raw) => {
                let start = parse_date("startDate", raw)?;
                Some(project_payoff_date(start, terms.frequency, schedule.number_of_payments as u32)?)
            }
            None => None,
        };

        Ok(LoanOutput {
            payment: round_money(schedule.payment),
            number_of_payments: schedule.number_of_payments,
            total_interest_paid: round_money(schedule.total_interest),
            total_paid: round_money(schedule.total_paid),
            payoff_date,
            schedule: input
                .include_schedule
                .then(|| schedule.entries.iter().map(rounded_entry).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn car_loan() -> LoanInput {
        serde_json::from_str(r#"{"principal": 25000, "annualRate": 8.5, "termYears": 5}"#).unwrap()
    }

    #[test]
    fn test_car_loan() {
        let out = Loan.evaluate(&car_loan(), &EvalContext::default()).unwrap();
        assert_eq!(out.payment, 512.91);
        assert_eq!(out.number_of_payments, 60);
        assert_relative_eq!(out.total_interest_paid, 5774.80, epsilon = 0.011);

        let schedule = out.schedule.unwrap();
        let principal: f64 = schedule.iter().map(|e| e.principal).sum();
        assert_relative_eq!(principal, 25_000.0, epsilon = 0.5);
        assert_eq!(schedule.last().map(|e| e.ending_balance), Some(0.0));
    }

    #[test]
    fn test_zero_rate_by_payment_count() {
        let input: LoanInput = serde_json::from_str(
            r#"{"principal": 24000, "annualRate": 0, "numberOfPayments": 48, "includeSchedule": false}"#,
        )
        .unwrap();
        let out = Loan.evaluate(&input, &EvalContext::default()).unwrap();
        assert_eq!(out.payment, 500.0);
        assert_eq!(out.total_interest_paid, 0.0);
        assert!(out.schedule.is_none());
    }

    #[test]
    fn test_payoff_date() {
        let mut input = car_loan();
        input.start_date = Some("2024-03-01".to_string());
        let out = Loan.evaluate(&input, &EvalContext::default()).unwrap();
        assert_eq!(out.payoff_date, NaiveDate::from_ymd_opt(2029, 3, 1));
    }

    #[test]
    fn test_schedule_respects_context_cap() {
        let ctx = EvalContext::new().with_max_schedule_periods(24);
        let out = Loan.evaluate(&car_loan(), &ctx).unwrap();
        assert_eq!(out.number_of_payments, 24);
    }

    #[test]
    fn test_oversized_term_is_rejected() {
        let input: LoanInput =
            serde_json::from_str(r#"{"principal": 25000, "annualRate": 8.5, "termYears": 1e9}"#).unwrap();
        let err = Loan.evaluate(&input, &EvalContext::default()).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("termYears"));
        assert_eq!(err.message, "termYears must be between 0 and 100, got 1000000000");

        let input: LoanInput = serde_json::from_str(
            r#"{"principal": 25000, "annualRate": 8.5, "numberOfPayments": 2147483648}"#,
        )
        .unwrap();
        let err = Loan.evaluate(&input, &EvalContext::default()).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("numberOfPayments"));
    }

    #[test]
    fn test_validation() {
        let input: LoanInput = serde_json::from_str(
            r#"{"principal": -5, "annualRate": 75, "extraPayment": 10, "startDate": "03/01/2024"}"#,
        )
        .unwrap();
        let err = Loan.evaluate(&input, &EvalContext::default()).unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["principal", "annualRate", "termYears", "startDate", "extraPayment"]);
    }
}
