//! Mortgage equity calculator: current equity, how fast payments build it
//! and where it goes over the next few years

use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use serde::{Deserialize, Serialize};
use tally_core::{round_money, round_to, PaymentFrequency, TallyError, ValidationError, Validator};
use tally_finance::{
    cash_out_refinance, equity_breakdown, equity_projection, monthly_equity_build, CashOutRefinance,
    CashOutTerms, EquityPosition, EquityYear, LoanTerms, RefinancingOption, MAX_ANNUAL_RATE,
    MAX_APPRECIATION_RATE, MAX_TERM_YEARS,
};

pub struct MortgageEquity;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutInput {
    /// Annual, percent
    pub new_rate: f64,
    pub new_term_years: u32,
    #[serde(default)]
    pub cash_out: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageEquityInput {
    pub current_property_value: f64,
    pub purchase_price: f64,
    pub down_payment: f64,
    #[serde(default)]
    pub mortgage_balance: f64,
    /// Annual, percent; required while a balance remains
    #[serde(default)]
    pub interest_rate: Option<f64>,
    /// Required while a balance remains
    #[serde(default)]
    pub remaining_months: Option<u32>,
    #[serde(default)]
    pub improvements: f64,
    #[serde(default = "default_appreciation")]
    pub appreciation_rate: f64,
    #[serde(default = "default_projection_years")]
    pub projection_years: u32,
    #[serde(default)]
    pub refinance: Option<CashOutInput>,
}

fn default_appreciation() -> f64 {
    3.0
}

fn default_projection_years() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageEquityOutput {
    pub total_equity: f64,
    pub equity_percent: f64,
    pub loan_to_value: f64,
    pub equity_growth: f64,
    pub appreciation: f64,
    pub payment_equity: f64,
    pub borrowable_equity: f64,
    pub refinancing_options: Vec<RefinancingOption>,
    /// Absent for a home owned outright
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<f64>,
    pub monthly_equity_build: f64,
    /// Principal repaid over the next twelve payments
    pub annual_equity_build: f64,
    pub projection: Vec<EquityYear>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_out_refinance: Option<CashOutRefinance>,
}

static MORTGAGE_EQUITY_FIELDS: [FieldMeta; 10] = [
    FieldMeta::required("currentPropertyValue", "Number", "What the home would sell for today"),
    FieldMeta::required("purchasePrice", "Number", "Price originally paid"),
    FieldMeta::required("downPayment", "Number", "Cash put down at purchase"),
    FieldMeta::optional("mortgageBalance", "Number", "Outstanding mortgage principal", "0"),
    FieldMeta::optional("interestRate", "Number", "Mortgage rate, percent; needed with a balance", "none"),
    FieldMeta::optional("remainingMonths", "Number", "Payments left; needed with a balance", "none"),
    FieldMeta::optional("improvements", "Number", "Capital spent on the home since purchase", "0"),
    FieldMeta::optional("appreciationRate", "Number", "Yearly change in value, percent", "3"),
    FieldMeta::optional("projectionYears", "Number", "Years to project", "5"),
    FieldMeta::optional("refinance", "Object", "Cash-out scenario: newRate, newTermYears, cashOut", "none"),
];

static MORTGAGE_EQUITY_EXAMPLES: [&str; 1] = [
    r#"{"currentPropertyValue": 450000, "purchasePrice": 350000, "downPayment": 70000, "mortgageBalance": 250000, "interestRate": 6, "remainingMonths": 300}"#,
];

static MORTGAGE_EQUITY_RELATED: [&str; 3] = ["loan", "refinance", "rent_vs_buy"];

impl MortgageEquityInput {
    /// The remaining mortgage, `None` once the balance is gone
    fn mortgage(&self) -> Result<Option<LoanTerms>, TallyError> {
        if self.mortgage_balance <= 0.0 {
            return Ok(None);
        }
        match (self.interest_rate, self.remaining_months) {
            (Some(rate), Some(months)) => Ok(Some(LoanTerms::with_periods(
                self.mortgage_balance,
                rate,
                months,
                PaymentFrequency::Monthly,
            ))),
            (None, _) => Err(TallyError::validation(&[ValidationError::Required { field: "interestRate" }])),
            (_, None) => Err(TallyError::validation(&[ValidationError::Required { field: "remainingMonths" }])),
        }
    }
}

fn rounded_year(y: &EquityYear) -> EquityYear {
    EquityYear {
        year: y.year,
        property_value: round_money(y.property_value),
        mortgage_balance: round_money(y.mortgage_balance),
        equity: round_money(y.equity),
        loan_to_value: round_to(y.loan_to_value, 2),
        principal_paid: round_money(y.principal_paid),
        interest_paid: round_money(y.interest_paid),
    }
}

fn rounded_cash_out(r: &CashOutRefinance) -> CashOutRefinance {
    CashOutRefinance {
        new_balance: round_money(r.new_balance),
        current_payment: round_money(r.current_payment),
        new_payment: round_money(r.new_payment),
        monthly_savings: round_money(r.monthly_savings),
        new_loan_to_value: round_to(r.new_loan_to_value, 2),
        closing_costs: round_money(r.closing_costs),
        break_even_months: r.break_even_months.map(|m| round_to(m, 1)),
        within_ltv_limit: r.within_ltv_limit,
    }
}

impl Calculator for MortgageEquity {
    type Input = MortgageEquityInput;
    type Output = MortgageEquityOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "mortgage_equity",
            description: "Home equity today, equity built by each payment and a yearly projection",
            fields: &MORTGAGE_EQUITY_FIELDS,
            examples: &MORTGAGE_EQUITY_EXAMPLES,
            category: "finance/loans",
            related: &MORTGAGE_EQUITY_RELATED,
        }
    }

    fn validate(&self, input: &MortgageEquityInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        v.positive("currentPropertyValue", input.current_property_value)
            .positive("purchasePrice", input.purchase_price)
            .non_negative("downPayment", input.down_payment)
            .non_negative("mortgageBalance", input.mortgage_balance)
            .non_negative("improvements", input.improvements)
            .range("appreciationRate", input.appreciation_rate, -MAX_APPRECIATION_RATE, MAX_APPRECIATION_RATE)
            .positive_up_to("projectionYears", f64::from(input.projection_years), f64::from(MAX_TERM_YEARS));

        if input.down_payment > input.purchase_price {
            v.push(ValidationError::ExceedsLimit {
                field: "downPayment",
                value: input.down_payment,
                limit_field: "purchasePrice",
                limit: input.purchase_price,
            });
        }

        if input.mortgage_balance > 0.0 {
            match input.interest_rate {
                Some(rate) => {
                    v.range("interestRate", rate, 0.0, MAX_ANNUAL_RATE);
                }
                None => {
                    v.push(ValidationError::Required { field: "interestRate" });
                }
            }
            match input.remaining_months {
                Some(months) => {
                    v.positive_up_to("remainingMonths", f64::from(months), f64::from(MAX_TERM_YEARS * 12));
                }
                None => {
                    v.push(ValidationError::Required { field: "remainingMonths" });
                }
            }
        }

        if let Some(refinance) = &input.refinance {
            if input.mortgage_balance <= 0.0 {
                v.push(ValidationError::MustBePositive {
                    field: "mortgageBalance",
                    value: input.mortgage_balance,
                });
            }
            v.range("refinance.newRate", refinance.new_rate, 0.0, MAX_ANNUAL_RATE)
                .positive_up_to("refinance.newTermYears", f64::from(refinance.new_term_years), f64::from(MAX_TERM_YEARS))
                .non_negative("refinance.cashOut", refinance.cash_out);
        }
        v.finish()
    }

    fn calculate(&self, input: &MortgageEquityInput, _ctx: &EvalContext) -> Result<MortgageEquityOutput, TallyError> {
        let position = EquityPosition {
            property_value: input.current_property_value,
            mortgage_balance: input.mortgage_balance,
            purchase_price: input.purchase_price,
            down_payment: input.down_payment,
            improvements: input.improvements,
        };
        let breakdown = equity_breakdown(&position)?;
        let mortgage = input.mortgage()?;

        let projection = equity_projection(
            input.current_property_value,
            mortgage.as_ref(),
            input.appreciation_rate,
            input.projection_years,
        )?;

        let (monthly_payment, monthly_build) = match &mortgage {
            Some(m) => (Some(round_money(m.payment()?)), monthly_equity_build(m)?),
            None => (None, 0.0),
        };

        let cash_out = match (&mortgage, &input.refinance) {
            (Some(m), Some(r)) => {
                let terms = CashOutTerms {
                    new_rate: r.new_rate,
                    new_term_years: r.new_term_years,
                    cash_out: r.cash_out,
                };
                Some(rounded_cash_out(&cash_out_refinance(input.current_property_value, m, &terms)?))
            }
            _ => None,
        };

        Ok(MortgageEquityOutput {
            total_equity: round_money(breakdown.total_equity),
            equity_percent: round_to(breakdown.equity_percent, 2),
            loan_to_value: round_to(breakdown.loan_to_value, 2),
            equity_growth: round_money(breakdown.equity_growth),
            appreciation: round_money(breakdown.appreciation),
            payment_equity: round_money(breakdown.payment_equity),
            borrowable_equity: round_money(breakdown.borrowable_equity),
            refinancing_options: breakdown.options,
            monthly_payment,
            monthly_equity_build: round_money(monthly_build),
            annual_equity_build: round_money(projection.first().map_or(0.0, |y| y.principal_paid)),
            projection: projection.iter().map(rounded_year).collect(),
            cash_out_refinance: cash_out,
        })
    }
}
