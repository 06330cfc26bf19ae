//! Rent versus buy over a fixed horizon
//!
//! The buyer pays the mortgage schedule plus carrying costs and owns the
//! appreciated home less the remaining balance. The renter pays a growing
//! rent and keeps the down payment invested. Each year compares the two net
//! positions.

use crate::helpers::require_range;
use crate::loans::{LoanTerms, MAX_ANNUAL_RATE, MAX_TERM_YEARS};
use serde::Serialize;
use std::fmt;
use tally_core::{MetricsError, PaymentFrequency};

/// Largest yearly growth or decline accepted for rent, home value and investments
pub const MAX_GROWTH_RATE: f64 = 50.0;

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentVsBuyTerms {
    pub home_price: f64,
    pub down_payment: f64,
    /// Mortgage rate, annual percent
    pub annual_rate: f64,
    pub term_years: u32,
    /// One-off purchase costs, paid in the first year
    pub closing_costs: f64,
    /// Annual, percent of the purchase price
    pub property_tax_rate: f64,
    /// Annual, percent of the purchase price
    pub insurance_rate: f64,
    /// Annual, percent of the purchase price
    pub maintenance_rate: f64,
    /// Monthly
    pub hoa_fees: f64,
    /// Starting monthly rent
    pub monthly_rent: f64,
    /// Annual, percent
    pub rent_increase_rate: f64,
    /// Monthly renter's insurance and utilities
    pub renter_costs: f64,
    /// Annual, percent
    pub appreciation_rate: f64,
    /// Annual return on the invested down payment, percent
    pub investment_return_rate: f64,
    /// Horizon of the comparison
    pub years: u32,
}

impl RentVsBuyTerms {
    pub fn validate(&self) -> Result<(), MetricsError> {
        require_range("home_price", self.home_price, f64::MIN_POSITIVE, f64::MAX)?;
        // The buyer always borrows something
        if !(self.down_payment >= 0.0 && self.down_payment < self.home_price) {
            return Err(MetricsError::out_of_range("down_payment", self.down_payment, 0.0, self.home_price));
        }
        require_range("annual_rate", self.annual_rate, 0.0, MAX_ANNUAL_RATE)?;
        require_range("term_years", f64::from(self.term_years), 1.0, f64::from(MAX_TERM_YEARS))?;
        require_range("years", f64::from(self.years), 1.0, f64::from(MAX_TERM_YEARS))?;
        for (name, value) in [
            ("closing_costs", self.closing_costs),
            ("hoa_fees", self.hoa_fees),
            ("monthly_rent", self.monthly_rent),
            ("renter_costs", self.renter_costs),
        ] {
            require_range(name, value, 0.0, f64::MAX)?;
        }
        for (name, value) in [
            ("property_tax_rate", self.property_tax_rate),
            ("insurance_rate", self.insurance_rate),
            ("maintenance_rate", self.maintenance_rate),
        ] {
            require_range(name, value, 0.0, 100.0)?;
        }
        for (name, value) in [
            ("rent_increase_rate", self.rent_increase_rate),
            ("appreciation_rate", self.appreciation_rate),
            ("investment_return_rate", self.investment_return_rate),
        ] {
            require_range(name, value, -MAX_GROWTH_RATE, MAX_GROWTH_RATE)?;
        }
        Ok(())
    }

    pub fn mortgage(&self) -> LoanTerms {
        LoanTerms::with_periods(
            self.home_price - self.down_payment,
            self.annual_rate,
            self.term_years.saturating_mul(12),
            PaymentFrequency::Monthly,
        )
    }

    /// Tax, insurance, maintenance and HOA for one month
    pub fn monthly_carrying_cost(&self) -> f64 {
        let annual_rate = self.property_tax_rate + self.insurance_rate + self.maintenance_rate;
        self.home_price * annual_rate / 100.0 / MONTHS_PER_YEAR + self.hoa_fees
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Buy,
    Rent,
    Even,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "buy",
            Decision::Rent => "rent",
            Decision::Even => "even",
        };
        f.write_str(s)
    }
}

/// Cumulative position of both choices at the end of a year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyYear {
    pub year: u32,
    /// Everything the buyer has paid so far, closing costs included
    pub ownership_cost: f64,
    pub rental_cost: f64,
    pub home_value: f64,
    pub loan_balance: f64,
    pub home_equity: f64,
    pub investment_value: f64,
    /// Equity less cumulative ownership cost
    pub net_ownership: f64,
    /// Invested down payment less cumulative rent
    pub net_renting: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuy {
    pub monthly_mortgage_payment: f64,
    /// Mortgage plus carrying costs in the first year
    pub monthly_ownership_cost: f64,
    /// Rent plus renter costs in the first year
    pub monthly_rental_cost: f64,
    pub total_ownership_cost: f64,
    pub total_rental_cost: f64,
    pub home_equity: f64,
    pub investment_value: f64,
    pub net_ownership_value: f64,
    pub net_rental_value: f64,
    /// First year in which buying is ahead; `None` if it never is within the horizon
    pub break_even_year: Option<u32>,
    pub decision: Decision,
    /// How far ahead the better choice is at the horizon
    pub advantage: f64,
    pub yearly: Vec<RentVsBuyYear>,
}

pub fn rent_vs_buy(terms: &RentVsBuyTerms) -> Result<RentVsBuy, MetricsError> {
    terms.validate()?;

    let mortgage = terms.mortgage();
    let mut schedule = mortgage.schedule()?;
    let monthly_mortgage_payment = schedule.payment();
    let carrying = terms.monthly_carrying_cost() * MONTHS_PER_YEAR;
    let renter_costs = terms.renter_costs * MONTHS_PER_YEAR;

    let appreciation = 1.0 + terms.appreciation_rate / 100.0;
    let investment_growth = 1.0 + terms.investment_return_rate / 100.0;
    let rent_growth = 1.0 + terms.rent_increase_rate / 100.0;

    let mut ownership_cost = terms.closing_costs;
    let mut rental_cost = 0.0;
    let mut rent = terms.monthly_rent;
    let mut home_value = terms.home_price;
    let mut investment_value = terms.down_payment;
    let mut loan_balance = mortgage.principal;

    let mut yearly = Vec::with_capacity(terms.years as usize);
    for year in 1..=terms.years {
        for entry in schedule.by_ref().take(12) {
            ownership_cost += entry.payment;
            loan_balance = entry.ending_balance;
        }
        ownership_cost += carrying;
        rental_cost += rent * MONTHS_PER_YEAR + renter_costs;
        rent *= rent_growth;

        home_value *= appreciation;
        investment_value *= investment_growth;
        let home_equity = (home_value - loan_balance).max(0.0);

        yearly.push(RentVsBuyYear {
            year,
            ownership_cost,
            rental_cost,
            home_value,
            loan_balance,
            home_equity,
            investment_value,
            net_ownership: home_equity - ownership_cost,
            net_renting: investment_value - rental_cost,
        });
    }

    let Some(last) = yearly.last().copied() else {
        return Err(MetricsError::out_of_range("years", 0.0, 1.0, f64::from(MAX_TERM_YEARS)));
    };
    let break_even_year = yearly
        .iter()
        .find(|y| y.net_ownership >= y.net_renting)
        .map(|y| y.year);
    let decision = if last.net_ownership > last.net_renting {
        Decision::Buy
    } else if last.net_ownership < last.net_renting {
        Decision::Rent
    } else {
        Decision::Even
    };

    tracing::debug!(
        years = terms.years,
        %decision,
        break_even = ?break_even_year,
        "compared renting and buying"
    );

    Ok(RentVsBuy {
        monthly_mortgage_payment,
        monthly_ownership_cost: monthly_mortgage_payment + terms.monthly_carrying_cost(),
        monthly_rental_cost: terms.monthly_rent + terms.renter_costs,
        total_ownership_cost: last.ownership_cost,
        total_rental_cost: last.rental_cost,
        home_equity: last.home_equity,
        investment_value: last.investment_value,
        net_ownership_value: last.net_ownership,
        net_rental_value: last.net_renting,
        break_even_year,
        decision,
        advantage: (last.net_ownership - last.net_renting).abs(),
        yearly,
    })
}
