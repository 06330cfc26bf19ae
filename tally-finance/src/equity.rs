//! Home equity: where the owner stands today and how the mortgage schedule
//! builds equity from here on.
//!
//! The remaining mortgage is an ordinary [`LoanTerms`] whose principal is the
//! current balance. Projections walk its [`Schedule`](crate::loans::Schedule)
//! a year of payments at a time.

use crate::helpers::{periodic_rate, ratio_or_zero, require_range};
use crate::loans::{periodic_payment, LoanTerms, MAX_ANNUAL_RATE, MAX_TERM_YEARS};
use serde::Serialize;
use tally_core::MetricsError;

/// Share of current equity a lender will usually advance against
pub const BORROWABLE_EQUITY_SHARE: f64 = 0.85;

/// Highest loan-to-value, percent, for cash-out and rate/term refinancing
pub const CONFORMING_LTV_LIMIT: f64 = 80.0;

/// Highest loan-to-value, percent, for a home equity line of credit
pub const HELOC_LTV_LIMIT: f64 = 85.0;

/// Closing costs of a cash-out refinance, percent of the new loan
pub const CASH_OUT_CLOSING_COST_RATE: f64 = 3.0;

/// Largest yearly change in property value accepted for a projection, percent
pub const MAX_APPRECIATION_RATE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPosition {
    pub property_value: f64,
    /// Zero for a home owned outright
    pub mortgage_balance: f64,
    pub purchase_price: f64,
    pub down_payment: f64,
    /// Capital spent on the property since purchase
    pub improvements: f64,
}

impl EquityPosition {
    pub fn validate(&self) -> Result<(), MetricsError> {
        require_range("property_value", self.property_value, f64::MIN_POSITIVE, f64::MAX)?;
        require_range("mortgage_balance", self.mortgage_balance, 0.0, f64::MAX)?;
        require_range("purchase_price", self.purchase_price, f64::MIN_POSITIVE, f64::MAX)?;
        require_range("down_payment", self.down_payment, 0.0, self.purchase_price)?;
        require_range("improvements", self.improvements, 0.0, f64::MAX)
    }

    /// Property value less the mortgage; negative when under water
    pub fn equity(&self) -> f64 {
        self.property_value - self.mortgage_balance
    }

    pub fn loan_to_value(&self) -> f64 {
        self.mortgage_balance / self.property_value * 100.0
    }
}

/// Financing routes open at a given equity position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefinancingOption {
    CashOut,
    RateAndTerm,
    Heloc,
    HomeEquityLoan,
}

/// Options available at `equity_percent` and `loan_to_value`, both percent
pub fn refinancing_options(equity_percent: f64, loan_to_value: f64) -> Vec<RefinancingOption> {
    let conforming = loan_to_value <= CONFORMING_LTV_LIMIT;
    let mut options = Vec::new();
    if conforming && equity_percent >= 20.0 {
        options.push(RefinancingOption::CashOut);
    }
    if conforming {
        options.push(RefinancingOption::RateAndTerm);
    }
    if loan_to_value <= HELOC_LTV_LIMIT && equity_percent >= 15.0 {
        options.push(RefinancingOption::Heloc);
    }
    if conforming && equity_percent >= 20.0 {
        options.push(RefinancingOption::HomeEquityLoan);
    }
    options
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityBreakdown {
    pub total_equity: f64,
    /// Equity as a percent of the property value
    pub equity_percent: f64,
    pub loan_to_value: f64,
    /// Change in equity since the down payment
    pub equity_growth: f64,
    /// Rise in value not explained by improvements, never negative
    pub appreciation: f64,
    /// Original loan principal repaid so far
    pub payment_equity: f64,
    pub borrowable_equity: f64,
    pub options: Vec<RefinancingOption>,
}

pub fn equity_breakdown(position: &EquityPosition) -> Result<EquityBreakdown, MetricsError> {
    position.validate()?;

    let total_equity = position.equity();
    let equity_percent = total_equity / position.property_value * 100.0;
    let loan_to_value = position.loan_to_value();
    let original_loan = position.purchase_price - position.down_payment;

    Ok(EquityBreakdown {
        total_equity,
        equity_percent,
        loan_to_value,
        equity_growth: total_equity - position.down_payment,
        appreciation: (position.property_value - position.purchase_price - position.improvements).max(0.0),
        payment_equity: (original_loan - position.mortgage_balance).max(0.0),
        borrowable_equity: (total_equity * BORROWABLE_EQUITY_SHARE).max(0.0),
        options: refinancing_options(equity_percent, loan_to_value),
    })
}

/// Principal repaid by the next scheduled payment
pub fn monthly_equity_build(mortgage: &LoanTerms) -> Result<f64, MetricsError> {
    Ok(mortgage.schedule()?.next().map_or(0.0, |entry| entry.principal))
}

/// One year of an equity projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityYear {
    /// 1-based
    pub year: u32,
    pub property_value: f64,
    pub mortgage_balance: f64,
    pub equity: f64,
    pub loan_to_value: f64,
    /// Principal repaid during the year
    pub principal_paid: f64,
    pub interest_paid: f64,
}

/// Year-by-year value, balance and equity.
///
/// `mortgage` is `None` for a home owned outright. The property grows by
/// `appreciation_rate` percent a year; the balance follows the schedule and
/// stays at zero once it is paid off.
pub fn equity_projection(
    property_value: f64,
    mortgage: Option<&LoanTerms>,
    appreciation_rate: f64,
    years: u32,
) -> Result<Vec<EquityYear>, MetricsError> {
    require_range("property_value", property_value, f64::MIN_POSITIVE, f64::MAX)?;
    require_range("appreciation_rate", appreciation_rate, -MAX_APPRECIATION_RATE, MAX_APPRECIATION_RATE)?;
    require_range("years", f64::from(years), 1.0, f64::from(MAX_TERM_YEARS))?;

    let mut schedule = mortgage.map(LoanTerms::schedule).transpose()?;
    let payments_per_year = mortgage.map_or(12, |m| m.frequency.payments_per_year()) as usize;
    let mut balance = mortgage.map_or(0.0, |m| m.principal);
    let growth = 1.0 + appreciation_rate / 100.0;
    let mut value = property_value;

    let projection: Vec<EquityYear> = (1..=years)
        .map(|year| {
            value *= growth;
            let (mut principal_paid, mut interest_paid) = (0.0, 0.0);
            if let Some(schedule) = schedule.as_mut() {
                for entry in schedule.by_ref().take(payments_per_year) {
                    principal_paid += entry.principal;
                    interest_paid += entry.interest;
                    balance = entry.ending_balance;
                }
            }
            EquityYear {
                year,
                property_value: value,
                mortgage_balance: balance,
                equity: value - balance,
                loan_to_value: ratio_or_zero(balance, value) * 100.0,
                principal_paid,
                interest_paid,
            }
        })
        .collect();

    tracing::debug!(
        years,
        final_equity = projection.last().map_or(0.0, |y| y.equity),
        "projected equity"
    );

    Ok(projection)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashOutTerms {
    /// Annual, percent
    pub new_rate: f64,
    pub new_term_years: u32,
    /// Cash taken out on top of the current balance
    pub cash_out: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOutRefinance {
    pub new_balance: f64,
    pub current_payment: f64,
    pub new_payment: f64,
    /// Negative when the new payment is higher
    pub monthly_savings: f64,
    pub new_loan_to_value: f64,
    pub closing_costs: f64,
    /// `None` when the new loan saves nothing each month
    pub break_even_months: Option<f64>,
    pub within_ltv_limit: bool,
}

/// Replace the remaining monthly mortgage with a new loan that also pays out
/// `terms.cash_out`.
pub fn cash_out_refinance(
    property_value: f64,
    mortgage: &LoanTerms,
    terms: &CashOutTerms,
) -> Result<CashOutRefinance, MetricsError> {
    require_range("property_value", property_value, f64::MIN_POSITIVE, f64::MAX)?;
    require_range("new_rate", terms.new_rate, 0.0, MAX_ANNUAL_RATE)?;
    require_range("new_term_years", f64::from(terms.new_term_years), 1.0, f64::from(MAX_TERM_YEARS))?;
    require_range("cash_out", terms.cash_out, 0.0, f64::MAX)?;
    mortgage.validate()?;

    let current_payment = mortgage.payment()?;
    let new_balance = mortgage.principal + terms.cash_out;
    let new_payment = periodic_payment(
        new_balance,
        periodic_rate(terms.new_rate, 12.0),
        terms.new_term_years * 12,
    )?;
    let monthly_savings = current_payment - new_payment;
    let closing_costs = new_balance * CASH_OUT_CLOSING_COST_RATE / 100.0;
    let new_loan_to_value = new_balance / property_value * 100.0;

    Ok(CashOutRefinance {
        new_balance,
        current_payment,
        new_payment,
        monthly_savings,
        new_loan_to_value,
        closing_costs,
        break_even_months: (monthly_savings > 0.0).then(|| closing_costs / monthly_savings),
        within_ltv_limit: new_loan_to_value <= CONFORMING_LTV_LIMIT,
    })
}
