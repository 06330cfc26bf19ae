//! Refinance analysis: compare the remaining loan with a new one

use crate::helpers::periodic_rate;
use crate::loans::{periodic_payment, MAX_ANNUAL_RATE, MAX_TERM_YEARS};
use serde::Serialize;
use tally_core::MetricsError;

/// Annual rate, percent, used to discount monthly savings
pub const REFINANCE_DISCOUNT_RATE: f64 = 5.0;

/// Both loans are monthly
const MONTHS_PER_YEAR: f64 = 12.0;

/// Longest remaining term either loan may have
const MAX_TERM_MONTHS: u32 = MAX_TERM_YEARS * 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinanceTerms {
    pub current_balance: f64,
    /// Annual, percent
    pub current_rate: f64,
    pub months_remaining: u32,
    /// Annual, percent
    pub new_rate: f64,
    pub new_term_years: u32,
    pub closing_costs: f64,
}

impl RefinanceTerms {
    pub fn validate(&self) -> Result<(), MetricsError> {
        if !self.current_balance.is_finite() || self.current_balance <= 0.0 {
            return Err(MetricsError::out_of_range("current_balance", self.current_balance, 0.0, f64::MAX));
        }
        for (name, rate) in [("current_rate", self.current_rate), ("new_rate", self.new_rate)] {
            if !(0.0..=MAX_ANNUAL_RATE).contains(&rate) {
                return Err(MetricsError::out_of_range(name, rate, 0.0, MAX_ANNUAL_RATE));
            }
        }
        if !(1..=MAX_TERM_MONTHS).contains(&self.months_remaining) {
            return Err(MetricsError::out_of_range(
                "months_remaining",
                f64::from(self.months_remaining),
                1.0,
                f64::from(MAX_TERM_MONTHS),
            ));
        }
        if !(1..=MAX_TERM_YEARS).contains(&self.new_term_years) {
            return Err(MetricsError::out_of_range(
                "new_term_years",
                f64::from(self.new_term_years),
                1.0,
                f64::from(MAX_TERM_YEARS),
            ));
        }
        if !self.closing_costs.is_finite() || self.closing_costs < 0.0 {
            return Err(MetricsError::out_of_range("closing_costs", self.closing_costs, 0.0, f64::MAX));
        }
        Ok(())
    }

    fn new_term_months(&self) -> u32 {
        self.new_term_years.saturating_mul(12)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinanceAnalysis {
    pub current_payment: f64,
    pub new_payment: f64,
    pub monthly_savings: f64,
    /// Months of savings needed to cover closing costs; `None` when the new
    /// loan saves nothing
    pub break_even_months: Option<f64>,
    pub first_year_savings: f64,
    pub five_year_savings: f64,
    /// Payments avoided over the overlapping months, net of closing costs
    pub total_cost_savings: f64,
    /// Present value of the monthly savings minus closing costs
    pub net_present_value: f64,
}

impl RefinanceAnalysis {
    /// Savings pay back the closing costs and leave something on top
    pub fn is_worthwhile(&self) -> bool {
        self.net_present_value > 0.0
    }
}

/// Analyze with the default [`REFINANCE_DISCOUNT_RATE`]
pub fn analyze_refinance(terms: &RefinanceTerms) -> Result<RefinanceAnalysis, MetricsError> {
    analyze_refinance_with_discount(terms, REFINANCE_DISCOUNT_RATE)
}

pub fn analyze_refinance_with_discount(
    terms: &RefinanceTerms,
    annual_discount_rate: f64,
) -> Result<RefinanceAnalysis, MetricsError> {
    terms.validate()?;

    let current_payment = periodic_payment(
        terms.current_balance,
        periodic_rate(terms.current_rate, MONTHS_PER_YEAR),
        terms.months_remaining,
    )?;
    let new_months = terms.new_term_months();
    let new_payment = periodic_payment(
        terms.current_balance,
        periodic_rate(terms.new_rate, MONTHS_PER_YEAR),
        new_months,
    )?;

    let monthly_savings = current_payment - new_payment;
    let break_even_months = (monthly_savings > 0.0).then(|| terms.closing_costs / monthly_savings);

    // Savings accrue only while both loans would still be paying
    let overlap = terms.months_remaining.min(new_months);
    let total_current = current_payment * terms.months_remaining as f64;
    let total_new = new_payment * overlap as f64;

    let monthly_discount = 1.0 / (1.0 + periodic_rate(annual_discount_rate, MONTHS_PER_YEAR));
    let discounted_savings: f64 = (1..=overlap)
        .scan(1.0, |factor, _| {
            *factor *= monthly_discount;
            Some(monthly_savings * *factor)
        })
        .sum();

    let analysis = RefinanceAnalysis {
        current_payment,
        new_payment,
        monthly_savings,
        break_even_months,
        first_year_savings: monthly_savings * 12.0,
        five_year_savings: monthly_savings * 60.0,
        total_cost_savings: total_current - total_new - terms.closing_costs,
        net_present_value: discounted_savings - terms.closing_costs,
    };

    tracing::debug!(
        monthly_savings = analysis.monthly_savings,
        break_even = ?analysis.break_even_months,
        npv = analysis.net_present_value,
        "analyzed refinance"
    );

    Ok(analysis)
}
