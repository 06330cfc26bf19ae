//! Rent versus buy calculator

use crate::{Calculator, CalculatorMeta, EvalContext, FieldMeta};
use serde::{Deserialize, Serialize};
use tally_core::{round_money, TallyError, ValidationError, Validator};
use tally_finance::{
    rent_vs_buy, Decision, RentVsBuyTerms, RentVsBuyYear, MAX_ANNUAL_RATE, MAX_GROWTH_RATE,
    MAX_TERM_YEARS,
};

pub struct RentVsBuyCalculator;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyInput {
    pub home_price: f64,
    pub down_payment: f64,
    /// Mortgage rate, annual percent
    pub interest_rate: f64,
    #[serde(default = "default_loan_term")]
    pub loan_term_years: u32,
    pub monthly_rent: f64,
    #[serde(default)]
    pub closing_costs: f64,
    #[serde(default = "default_property_tax_rate")]
    pub property_tax_rate: f64,
    #[serde(default = "default_insurance_rate")]
    pub home_insurance_rate: f64,
    #[serde(default = "default_maintenance_rate")]
    pub maintenance_rate: f64,
    #[serde(default)]
    pub hoa_fees: f64,
    #[serde(default = "default_growth")]
    pub rent_increase_rate: f64,
    #[serde(default)]
    pub renter_costs: f64,
    #[serde(default = "default_growth")]
    pub home_appreciation_rate: f64,
    #[serde(default = "default_investment_return")]
    pub investment_return_rate: f64,
    #[serde(default = "default_analysis_years")]
    pub analysis_years: u32,
}

fn default_loan_term() -> u32 {
    30
}

fn default_property_tax_rate() -> f64 {
    1.2
}

fn default_insurance_rate() -> f64 {
    0.5
}

fn default_maintenance_rate() -> f64 {
    1.0
}

fn default_growth() -> f64 {
    3.0
}

fn default_investment_return() -> f64 {
    7.0
}

fn default_analysis_years() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyOutput {
    pub monthly_mortgage_payment: f64,
    pub monthly_ownership_cost: f64,
    pub monthly_rental_cost: f64,
    pub total_ownership_cost: f64,
    pub total_rental_cost: f64,
    pub home_equity: f64,
    pub investment_value: f64,
    pub net_ownership_value: f64,
    pub net_rental_value: f64,
    pub break_even_year: Option<u32>,
    pub decision: Decision,
    pub advantage: f64,
    pub yearly: Vec<RentVsBuyYear>,
}

static RENT_VS_BUY_FIELDS: [FieldMeta; 15] = [
    FieldMeta::required("homePrice", "Number", "Purchase price"),
    FieldMeta::required("downPayment", "Number", "Cash put down; invested instead when renting"),
    FieldMeta::required("interestRate", "Number", "Mortgage rate, percent (0-50)"),
    FieldMeta::optional("loanTermYears", "Number", "Mortgage term", "30"),
    FieldMeta::required("monthlyRent", "Number", "Rent in the first year"),
    FieldMeta::optional("closingCosts", "Number", "One-off purchase costs", "0"),
    FieldMeta::optional("propertyTaxRate", "Number", "Yearly, percent of price", "1.2"),
    FieldMeta::optional("homeInsuranceRate", "Number", "Yearly, percent of price", "0.5"),
    FieldMeta::optional("maintenanceRate", "Number", "Yearly, percent of price", "1"),
    FieldMeta::optional("hoaFees", "Number", "Monthly association fees", "0"),
    FieldMeta::optional("rentIncreaseRate", "Number", "Yearly rent increase, percent", "3"),
    FieldMeta::optional("renterCosts", "Number", "Monthly renter insurance and utilities", "0"),
    FieldMeta::optional("homeAppreciationRate", "Number", "Yearly change in home value, percent", "3"),
    FieldMeta::optional("investmentReturnRate", "Number", "Yearly return on the down payment, percent", "7"),
    FieldMeta::optional("analysisYears", "Number", "Length of the comparison", "10"),
];

static RENT_VS_BUY_EXAMPLES: [&str; 1] = [
    r#"{"homePrice": 400000, "downPayment": 80000, "interestRate": 6.5, "monthlyRent": 2500, "closingCosts": 12000, "renterCosts": 225}"#,
];

static RENT_VS_BUY_RELATED: [&str; 2] = ["loan", "mortgage_equity"];

impl RentVsBuyInput {
    fn terms(&self) -> RentVsBuyTerms {
        RentVsBuyTerms {
            home_price: self.home_price,
            down_payment: self.down_payment,
            annual_rate: self.interest_rate,
            term_years: self.loan_term_years,
            closing_costs: self.closing_costs,
            property_tax_rate: self.property_tax_rate,
            insurance_rate: self.home_insurance_rate,
            maintenance_rate: self.maintenance_rate,
            hoa_fees: self.hoa_fees,
            monthly_rent: self.monthly_rent,
            rent_increase_rate: self.rent_increase_rate,
            renter_costs: self.renter_costs,
            appreciation_rate: self.home_appreciation_rate,
            investment_return_rate: self.investment_return_rate,
            years: self.analysis_years,
        }
    }
}

fn rounded_year(y: &RentVsBuyYear) -> RentVsBuyYear {
    RentVsBuyYear {
        year: y.year,
        ownership_cost: round_money(y.ownership_cost),
        rental_cost: round_money(y.rental_cost),
        home_value: round_money(y.home_value),
        loan_balance: round_money(y.loan_balance),
        home_equity: round_money(y.home_equity),
        investment_value: round_money(y.investment_value),
        net_ownership: round_money(y.net_ownership),
        net_renting: round_money(y.net_renting),
    }
}

impl Calculator for RentVsBuyCalculator {
    type Input = RentVsBuyInput;
    type Output = RentVsBuyOutput;

    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            name: "rent_vs_buy",
            description: "Year-by-year net position of buying a home against renting and investing",
            fields: &RENT_VS_BUY_FIELDS,
            examples: &RENT_VS_BUY_EXAMPLES,
            category: "finance/housing",
            related: &RENT_VS_BUY_RELATED,
        }
    }

    fn validate(&self, input: &RentVsBuyInput) -> Result<(), Vec<ValidationError>> {
        let mut v = Validator::new();
        v.positive("homePrice", input.home_price)
            .non_negative("downPayment", input.down_payment)
            .below("downPayment", input.down_payment, "homePrice", input.home_price)
            .range("interestRate", input.interest_rate, 0.0, MAX_ANNUAL_RATE)
            .positive_up_to("loanTermYears", f64::from(input.loan_term_years), f64::from(MAX_TERM_YEARS))
            .non_negative("monthlyRent", input.monthly_rent)
            .non_negative("closingCosts", input.closing_costs)
            .range("propertyTaxRate", input.property_tax_rate, 0.0, 100.0)
            .range("homeInsuranceRate", input.home_insurance_rate, 0.0, 100.0)
            .range("maintenanceRate", input.maintenance_rate, 0.0, 100.0)
            .non_negative("hoaFees", input.hoa_fees)
            .range("rentIncreaseRate", input.rent_increase_rate, -MAX_GROWTH_RATE, MAX_GROWTH_RATE)
            .non_negative("renterCosts", input.renter_costs)
            .range("homeAppreciationRate", input.home_appreciation_rate, -MAX_GROWTH_RATE, MAX_GROWTH_RATE)
            .range("investmentReturnRate", input.investment_return_rate, -MAX_GROWTH_RATE, MAX_GROWTH_RATE)
            .positive_up_to("analysisYears", f64::from(input.analysis_years), f64::from(MAX_TERM_YEARS));
        v.finish()
    }

    fn calculate(&self, input: &RentVsBuyInput, _ctx: &EvalContext) -> Result<RentVsBuyOutput, TallyError> {
        let r = rent_vs_buy(&input.terms())?;

        Ok(RentVsBuyOutput {
            monthly_mortgage_payment: round_money(r.monthly_mortgage_payment),
            monthly_ownership_cost: round_money(r.monthly_ownership_cost),
            monthly_rental_cost: round_money(r.monthly_rental_cost),
            total_ownership_cost: round_money(r.total_ownership_cost),
            total_rental_cost: round_money(r.total_rental_cost),
            home_equity: round_money(r.home_equity),
            investment_value: round_money(r.investment_value),
            net_ownership_value: round_money(r.net_ownership_value),
            net_rental_value: round_money(r.net_rental_value),
            break_even_year: r.break_even_year,
            decision: r.decision,
            advantage: round_money(r.advantage),
            yearly: r.yearly.iter().map(rounded_year).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RentVsBuyInput {
        serde_json::from_str(RENT_VS_BUY_EXAMPLES[0]).unwrap()
    }

    #[test]
    fn test_defaults_fill_in() {
        let i = input();
        assert_eq!(i.loan_term_years, 30);
        assert_eq!(i.property_tax_rate, 1.2);
        assert_eq!(i.analysis_years, 10);
    }

    #[test]
    fn test_ten_years() {
        let out = RentVsBuyCalculator.evaluate(&input(), &EvalContext::default()).unwrap();
        assert_eq!(out.monthly_mortgage_payment, 2022.62);
        assert_eq!(out.monthly_ownership_cost, 2922.62);
        assert_eq!(out.monthly_rental_cost, 2725.0);
        assert_eq!(out.total_rental_cost, 370_916.38);
        assert_eq!(out.home_equity, 266_282.95);
        assert_eq!(out.decision, Decision::Buy);
        assert_eq!(out.break_even_year, Some(2));
        assert_eq!(out.yearly.len(), 10);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["decision"], "buy");
        assert_eq!(json["yearly"][0]["rentalCost"], 32_700.0);
    }

    #[test]
    fn test_validation() {
        let mut i = input();
        i.down_payment = 400_000.0;
        i.analysis_years = 0;
        i.interest_rate = 80.0;
        let err = RentVsBuyCalculator.evaluate(&i, &EvalContext::default()).unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["downPayment", "interestRate", "analysisYears"]);
    }
}
