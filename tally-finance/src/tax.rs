//! Capital gains and holding period

use crate::drawdown::compound_annual_growth;
use chrono::NaiveDate;
use serde::Serialize;
use tally_core::MetricsError;

/// Held strictly longer than this many days counts as long-term
pub const LONG_TERM_HOLDING_DAYS: i64 = 365;

/// Share of a long-term gain excluded from tax
pub const LONG_TERM_EXCLUSION: f64 = 0.5;

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sale {
    pub purchase_price: f64,
    pub sale_price: f64,
    pub purchase_date: NaiveDate,
    pub sale_date: NaiveDate,
    /// Commissions and fees, deducted from proceeds
    pub transaction_costs: f64,
    /// Added to the cost basis
    pub improvements: f64,
    /// Marginal rate, percent
    pub tax_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGains {
    pub cost_basis: f64,
    pub net_proceeds: f64,
    /// Negative for a loss
    pub capital_gain: f64,
    pub holding_days: i64,
    pub holding_years: f64,
    pub long_term: bool,
    pub taxable_gain: f64,
    pub tax: f64,
    pub after_tax_gain: f64,
    /// Tax as a percent of the gain, 0 for a loss
    pub effective_tax_rate: f64,
    /// CAGR over the holding period; undefined for a same-day sale or
    /// non-positive proceeds
    pub annualized_return: Option<f64>,
}

/// Whole days between the two dates; fails when the sale comes first
pub fn holding_days(purchase: NaiveDate, sale: NaiveDate) -> Result<i64, MetricsError> {
    let days = (sale - purchase).num_days();
    if days < 0 {
        return Err(MetricsError::InvalidDate(format!(
            "sale date {} is before purchase date {}",
            sale, purchase
        )));
    }
    Ok(days)
}

pub fn is_long_term(days: i64) -> bool {
    days > LONG_TERM_HOLDING_DAYS
}

pub fn capital_gains(sale: &Sale) -> Result<CapitalGains, MetricsError> {
    if !sale.purchase_price.is_finite() || sale.purchase_price <= 0.0 {
        return Err(MetricsError::out_of_range("purchase_price", sale.purchase_price, 0.0, f64::MAX));
    }
    if !(0.0..=100.0).contains(&sale.tax_rate) {
        return Err(MetricsError::out_of_range("tax_rate", sale.tax_rate, 0.0, 100.0));
    }

    let days = holding_days(sale.purchase_date, sale.sale_date)?;
    let holding_years = days as f64 / DAYS_PER_YEAR;
    let long_term = is_long_term(days);

    let cost_basis = sale.purchase_price + sale.improvements;
    let net_proceeds = sale.sale_price - sale.transaction_costs;
    let capital_gain = net_proceeds - cost_basis;

    let taxable_gain = match (capital_gain > 0.0, long_term) {
        (false, _) => 0.0,
        (true, true) => capital_gain * (1.0 - LONG_TERM_EXCLUSION),
        (true, false) => capital_gain,
    };
    let tax = taxable_gain * sale.tax_rate / 100.0;

    let annualized_return = (days > 0 && net_proceeds > 0.0 && cost_basis > 0.0)
        .then(|| compound_annual_growth(cost_basis, net_proceeds, holding_years));

    Ok(CapitalGains {
        cost_basis,
        net_proceeds,
        capital_gain,
        holding_days: days,
        holding_years,
        long_term,
        taxable_gain,
        tax,
        after_tax_gain: capital_gain - tax,
        effective_tax_rate: if capital_gain > 0.0 { tax / capital_gain * 100.0 } else { 0.0 },
        annualized_return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale() -> Sale {
        Sale {
            purchase_price: 10_000.0,
            sale_price: 15_000.0,
            purchase_date: date(2020, 1, 15),
            sale_date: date(2023, 1, 15),
            transaction_costs: 100.0,
            improvements: 900.0,
            tax_rate: 20.0,
        }
    }

    #[test]
    fn test_long_term_gain_gets_exclusion() {
        let g = capital_gains(&sale()).unwrap();
        assert_eq!(g.holding_days, 1096);
        assert!(g.long_term);
        assert_relative_eq!(g.cost_basis, 10_900.0);
        assert_relative_eq!(g.net_proceeds, 14_900.0);
        assert_relative_eq!(g.capital_gain, 4_000.0);
        assert_relative_eq!(g.taxable_gain, 2_000.0);
        assert_relative_eq!(g.tax, 400.0);
        assert_relative_eq!(g.after_tax_gain, 3_600.0);
        assert_relative_eq!(g.effective_tax_rate, 10.0);
        assert_relative_eq!(g.holding_years, 1096.0 / 365.25);
        let cagr = g.annualized_return.unwrap();
        assert!(cagr > 10.0 && cagr < 11.0);
    }

    #[test]
    fn test_short_term_is_fully_taxable() {
        let s = Sale {
            sale_date: date(2020, 6, 1),
            ..sale()
        };
        let g = capital_gains(&s).unwrap();
        assert!(!g.long_term);
        assert_relative_eq!(g.taxable_gain, g.capital_gain);
    }

    #[test]
    fn test_exactly_one_year_is_short_term() {
        assert!(!is_long_term(365));
        assert!(is_long_term(366));
    }

    #[test]
    fn test_loss_owes_no_tax() {
        let s = Sale {
            sale_price: 8_000.0,
            ..sale()
        };
        let g = capital_gains(&s).unwrap();
        assert!(g.capital_gain < 0.0);
        assert_eq!(g.tax, 0.0);
        assert_eq!(g.taxable_gain, 0.0);
        assert_eq!(g.effective_tax_rate, 0.0);
        assert_relative_eq!(g.after_tax_gain, g.capital_gain);
    }

    #[test]
    fn test_same_day_sale_has_no_annualized_return() {
        let s = Sale {
            sale_date: date(2020, 1, 15),
            ..sale()
        };
        let g = capital_gains(&s).unwrap();
        assert_eq!(g.holding_days, 0);
        assert_eq!(g.annualized_return, None);
    }

    #[test]
    fn test_sale_before_purchase_is_rejected() {
        let s = Sale {
            sale_date: date(2019, 12, 31),
            ..sale()
        };
        assert!(matches!(capital_gains(&s), Err(MetricsError::InvalidDate(_))));
    }
}
