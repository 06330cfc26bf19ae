//! Amortization engine: periodic payment, schedules, early payoff
//!
//! A schedule is an iterator over [`AmortizationEntry`] values. Each run owns
//! its balance, so a baseline and an accelerated run never share state.

use crate::helpers::periodic_rate;
use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use tally_core::{MetricsError, PaymentFrequency, PaymentInterval};

/// Hard ceiling on schedule length
pub const DEFAULT_MAX_PERIODS: usize = 10_000;

/// Balance at or below this is treated as paid off
pub const PAYOFF_EPSILON: f64 = 0.01;

/// Highest accepted annual rate, percent
pub const MAX_ANNUAL_RATE: f64 = 50.0;

/// Longest accepted loan term
pub const MAX_TERM_YEARS: u32 = 100;

/// Most payments a loan at `frequency` may have
pub fn max_term_periods(frequency: PaymentFrequency) -> u32 {
    MAX_TERM_YEARS * frequency.payments_per_year()
}

/// Level payment that retires `principal` over `periods` at `rate` per period.
///
/// A zero rate is straight-line: principal / periods.
pub fn periodic_payment(principal: f64, rate: f64, periods: u32) -> Result<f64, MetricsError> {
    if periods == 0 || periods as usize > DEFAULT_MAX_PERIODS {
        return Err(MetricsError::out_of_range(
            "periods",
            f64::from(periods),
            1.0,
            DEFAULT_MAX_PERIODS as f64,
        ));
    }
    if rate == 0.0 {
        return Ok(principal / f64::from(periods));
    }
    // P * r / (1 - (1 + r)^-n)
    let discount = 1.0 - (1.0 + rate).powf(-f64::from(periods));
    Ok(principal * rate / discount)
}

/// Immutable description of a loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub principal: f64,
    /// Annual nominal rate, percent
    pub annual_rate: f64,
    pub periods: u32,
    pub frequency: PaymentFrequency,
    /// Added to every scheduled payment
    pub extra_payment: f64,
}

impl LoanTerms {
    /// Loan over `term_years` at the given payment frequency.
    ///
    /// Terms too long to represent saturate and are rejected by [`LoanTerms::validate`].
    pub fn new(principal: f64, annual_rate: f64, term_years: f64, frequency: PaymentFrequency) -> Self {
        let periods = (term_years * frequency.payments_per_year() as f64).round() as u32;
        Self::with_periods(principal, annual_rate, periods, frequency)
    }

    /// Loan over an explicit number of payments
    pub fn with_periods(principal: f64, annual_rate: f64, periods: u32, frequency: PaymentFrequency) -> Self {
        Self {
            principal,
            annual_rate,
            periods,
            frequency,
            extra_payment: 0.0,
        }
    }

    pub fn with_extra_payment(mut self, extra_payment: f64) -> Self {
        self.extra_payment = extra_payment;
        self
    }

    pub fn periodic_rate(&self) -> f64 {
        periodic_rate(self.annual_rate, self.frequency.payments_per_year() as f64)
    }

    pub fn term_years(&self) -> f64 {
        self.periods as f64 / self.frequency.payments_per_year() as f64
    }

    /// Scheduled payment, without any extra payment
    pub fn payment(&self) -> Result<f64, MetricsError> {
        periodic_payment(self.principal, self.periodic_rate(), self.periods)
    }

    pub fn validate(&self) -> Result<(), MetricsError> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(MetricsError::out_of_range("principal", self.principal, 0.0, f64::MAX));
        }
        if !(0.0..=MAX_ANNUAL_RATE).contains(&self.annual_rate) {
            return Err(MetricsError::out_of_range("annual_rate", self.annual_rate, 0.0, MAX_ANNUAL_RATE));
        }
        let most = max_term_periods(self.frequency);
        if self.periods == 0 || self.periods > most {
            return Err(MetricsError::out_of_range(
                "periods",
                f64::from(self.periods),
                1.0,
                f64::from(most),
            ));
        }
        if !(self.extra_payment >= 0.0 && self.extra_payment < self.principal) {
            return Err(MetricsError::out_of_range(
                "extra_payment",
                self.extra_payment,
                0.0,
                self.principal,
            ));
        }
        Ok(())
    }

    /// Iterate the schedule, capped at [`DEFAULT_MAX_PERIODS`]
    pub fn schedule(&self) -> Result<Schedule, MetricsError> {
        self.schedule_with_cap(DEFAULT_MAX_PERIODS)
    }

    pub fn schedule_with_cap(&self, max_periods: usize) -> Result<Schedule, MetricsError> {
        self.validate()?;
        Ok(Schedule {
            rate: self.periodic_rate(),
            payment: self.payment()?,
            extra: self.extra_payment,
            balance: self.principal,
            cumulative_interest: 0.0,
            period: 0,
            limit: (self.periods as usize).min(max_periods),
        })
    }
}

/// One row of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationEntry {
    /// 1-based
    pub period: u32,
    /// Principal plus interest actually paid this period
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub beginning_balance: f64,
    pub ending_balance: f64,
    pub cumulative_interest: f64,
}

/// Lazily generated schedule; stops once the balance is paid off
#[derive(Debug, Clone)]
pub struct Schedule {
    rate: f64,
    payment: f64,
    extra: f64,
    balance: f64,
    cumulative_interest: f64,
    period: u32,
    limit: usize,
}

impl Schedule {
    /// Balance left after the entries produced so far
    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn payment(&self) -> f64 {
        self.payment
    }
}

impl Iterator for Schedule {
    type Item = AmortizationEntry;

    fn next(&mut self) -> Option<AmortizationEntry> {
        if self.balance <= PAYOFF_EPSILON || self.period as usize >= self.limit {
            return None;
        }

        let beginning_balance = self.balance;
        let interest = beginning_balance * self.rate;
        let principal = (self.payment - interest + self.extra).min(beginning_balance);

        self.period += 1;
        self.balance = beginning_balance - principal;
        self.cumulative_interest += interest;

        Some(AmortizationEntry {
            period: self.period,
            payment: principal + interest,
            principal,
            interest,
            beginning_balance,
            ending_balance: self.balance,
            cumulative_interest: self.cumulative_interest,
        })
    }
}

/// Totals of a schedule run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    /// Scheduled payment, excluding extra payments
    pub payment: f64,
    pub number_of_payments: usize,
    pub total_interest: f64,
    pub total_paid: f64,
    pub final_balance: f64,
}

/// A fully generated schedule with its totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub payment: f64,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest: f64,
    pub total_paid: f64,
    /// Length of the schedule, which can be shorter than the term
    pub number_of_payments: usize,
    pub final_balance: f64,
}

impl AmortizationSchedule {
    pub fn summary(&self) -> LoanSummary {
        LoanSummary {
            payment: self.payment,
            number_of_payments: self.number_of_payments,
            total_interest: self.total_interest,
            total_paid: self.total_paid,
            final_balance: self.final_balance,
        }
    }
}

pub fn generate_schedule(terms: &LoanTerms) -> Result<AmortizationSchedule, MetricsError> {
    generate_schedule_with_cap(terms, DEFAULT_MAX_PERIODS)
}

/// Run the schedule to completion, never producing more than `max_periods` rows
pub fn generate_schedule_with_cap(
    terms: &LoanTerms,
    max_periods: usize,
) -> Result<AmortizationSchedule, MetricsError> {
    let mut schedule = terms.schedule_with_cap(max_periods)?;
    let payment = schedule.payment();
    let entries: Vec<AmortizationEntry> = schedule.by_ref().collect();
    let final_balance = schedule.balance();

    if entries.len() >= max_periods && final_balance > PAYOFF_EPSILON {
        tracing::warn!(
            max_periods,
            balance = final_balance,
            "amortization schedule truncated at iteration cap"
        );
    }

    let total_interest = entries.last().map_or(0.0, |e| e.cumulative_interest);
    let total_paid = entries.iter().map(|e| e.payment).sum();

    tracing::debug!(
        payment,
        periods = entries.len(),
        total_interest,
        "generated amortization schedule"
    );

    Ok(AmortizationSchedule {
        payment,
        number_of_payments: entries.len(),
        entries,
        total_interest,
        total_paid,
        final_balance,
    })
}

/// Baseline schedule compared with one carrying an extra payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyPayoff {
    pub baseline: LoanSummary,
    pub accelerated: LoanSummary,
    pub periods_saved: usize,
    pub years_saved: f64,
    pub interest_saved: f64,
}

pub fn early_payoff_analysis(terms: &LoanTerms) -> Result<EarlyPayoff, MetricsError> {
    early_payoff_analysis_with_cap(terms, DEFAULT_MAX_PERIODS)
}

/// Run the loan once without and once with `terms.extra_payment`
pub fn early_payoff_analysis_with_cap(
    terms: &LoanTerms,
    max_periods: usize,
) -> Result<EarlyPayoff, MetricsError> {
    let baseline = generate_schedule_with_cap(&terms.with_extra_payment(0.0), max_periods)?.summary();
    let accelerated = generate_schedule_with_cap(terms, max_periods)?.summary();

    let periods_saved = baseline
        .number_of_payments
        .saturating_sub(accelerated.number_of_payments);

    Ok(EarlyPayoff {
        baseline,
        accelerated,
        periods_saved,
        years_saved: periods_saved as f64 / terms.frequency.payments_per_year() as f64,
        interest_saved: baseline.total_interest - accelerated.total_interest,
    })
}

/// Calendar date of payment number `periods`, counting from `start`.
///
/// Payment k falls k intervals after `start`. Month steps clamp to the end
/// of shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn project_payoff_date(
    start: NaiveDate,
    frequency: PaymentFrequency,
    periods: u32,
) -> Result<NaiveDate, MetricsError> {
    let projected = match frequency.interval() {
        PaymentInterval::Days(days) => start.checked_add_days(Days::new(u64::from(days) * u64::from(periods))),
        PaymentInterval::Months(months) => start.checked_add_months(Months::new(months.saturating_mul(periods))),
    };
    projected.ok_or_else(|| {
        MetricsError::InvalidDate(format!(
            "{} payments ({}) from {} is outside the calendar",
            periods, frequency, start
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn car_loan() -> LoanTerms {
        LoanTerms::new(25_000.0, 8.5, 5.0, PaymentFrequency::Monthly)
    }

    #[test]
    fn test_periodic_payment_annuity() {
        let r = 8.5 / 100.0 / 12.0;
        assert_relative_eq!(periodic_payment(25_000.0, r, 60).unwrap(), 512.9133, epsilon = 1e-4);
    }

    #[test]
    fn test_periodic_payment_zero_rate_is_straight_line() {
        assert_eq!(periodic_payment(24_000.0, 0.0, 48).unwrap(), 500.0);
        assert!(periodic_payment(24_000.0, 0.0, 0).is_err());
    }

    #[test]
    fn test_terms_from_years() {
        let terms = car_loan();
        assert_eq!(terms.periods, 60);
        assert_relative_eq!(terms.term_years(), 5.0);
        let quarterly = LoanTerms::new(10_000.0, 6.0, 2.5, PaymentFrequency::Quarterly);
        assert_eq!(quarterly.periods, 10);
        assert_relative_eq!(quarterly.periodic_rate(), 0.015);
    }

    #[test]
    fn test_terms_validation() {
        assert!(car_loan().validate().is_ok());
        assert!(LoanTerms::new(0.0, 5.0, 5.0, PaymentFrequency::Monthly).validate().is_err());
        assert!(LoanTerms::new(1000.0, 51.0, 5.0, PaymentFrequency::Monthly).validate().is_err());
        assert!(LoanTerms::new(1000.0, -1.0, 5.0, PaymentFrequency::Monthly).validate().is_err());
        assert!(LoanTerms::new(1000.0, 5.0, 0.0, PaymentFrequency::Monthly).validate().is_err());
        assert!(car_loan().with_extra_payment(25_000.0).validate().is_err());
        assert!(car_loan().with_extra_payment(-5.0).validate().is_err());
    }

    #[test]
    fn test_full_schedule_car_loan() {
        let schedule = generate_schedule(&car_loan()).unwrap();
        assert_relative_eq!(schedule.payment, 512.9133, epsilon = 1e-4);
        assert_eq!(schedule.number_of_payments, 60);
        assert_relative_eq!(schedule.total_interest, 5774.80, epsilon = 0.01);

        let principal_paid: f64 = schedule.entries.iter().map(|e| e.principal).sum();
        assert_relative_eq!(principal_paid, 25_000.0, epsilon = 0.01);
        assert!(schedule.final_balance.abs() <= PAYOFF_EPSILON);
        assert_relative_eq!(schedule.total_paid, 25_000.0 + schedule.total_interest, epsilon = 0.01);
    }

    #[test]
    fn test_schedule_rows_are_consistent() {
        let entries: Vec<_> = car_loan().schedule().unwrap().collect();
        assert_eq!(entries[0].period, 1);
        assert_eq!(entries[0].beginning_balance, 25_000.0);
        assert_relative_eq!(entries[0].interest, 25_000.0 * 0.085 / 12.0, epsilon = 1e-9);
        for pair in entries.windows(2) {
            assert_eq!(pair[1].period, pair[0].period + 1);
            assert_eq!(pair[1].beginning_balance, pair[0].ending_balance);
            assert!(pair[1].ending_balance <= pair[0].ending_balance);
        }
    }

    #[test]
    fn test_zero_rate_schedule() {
        let terms = LoanTerms::with_periods(24_000.0, 0.0, 48, PaymentFrequency::Monthly);
        let schedule = generate_schedule(&terms).unwrap();
        assert_eq!(schedule.payment, 500.0);
        assert_eq!(schedule.number_of_payments, 48);
        assert_eq!(schedule.total_interest, 0.0);
    }

    #[test]
    fn test_schedule_cap() {
        let terms = LoanTerms::with_periods(100_000.0, 5.0, 360, PaymentFrequency::Monthly);
        let schedule = generate_schedule_with_cap(&terms, 12).unwrap();
        assert_eq!(schedule.number_of_payments, 12);
        assert!(schedule.final_balance > PAYOFF_EPSILON);
    }

    #[test]
    fn test_extra_payment_pays_off_early() {
        let terms = car_loan().with_extra_payment(200.0);
        let payoff = early_payoff_analysis(&terms).unwrap();
        assert_eq!(payoff.baseline.number_of_payments, 60);
        assert!(payoff.accelerated.number_of_payments < payoff.baseline.number_of_payments);
        assert!(payoff.interest_saved > 0.0);
        assert_eq!(
            payoff.periods_saved,
            payoff.baseline.number_of_payments - payoff.accelerated.number_of_payments
        );
        assert_relative_eq!(payoff.years_saved, payoff.periods_saved as f64 / 12.0);
        assert!(payoff.accelerated.final_balance.abs() <= PAYOFF_EPSILON);
    }

    #[test]
    fn test_early_payoff_without_extra_saves_nothing() {
        let payoff = early_payoff_analysis(&car_loan()).unwrap();
        assert_eq!(payoff.periods_saved, 0);
        assert_eq!(payoff.interest_saved, 0.0);
        assert_eq!(payoff.baseline, payoff.accelerated);
    }

    #[test]
    fn test_project_payoff_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            project_payoff_date(start, PaymentFrequency::Monthly, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            project_payoff_date(start, PaymentFrequency::Monthly, 60).unwrap(),
            NaiveDate::from_ymd_opt(2029, 1, 31).unwrap()
        );
        assert_eq!(
            project_payoff_date(start, PaymentFrequency::BiWeekly, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
        );
        assert_eq!(
            project_payoff_date(start, PaymentFrequency::Quarterly, 4).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }

    #[test]
    fn test_oversized_terms_are_rejected() {
        let endless = LoanTerms::new(25_000.0, 8.5, 1e9, PaymentFrequency::Monthly);
        assert!(endless.validate().is_err());
        assert!(generate_schedule(&endless).is_err());

        let wrapped = LoanTerms::with_periods(25_000.0, 8.5, 1 << 31, PaymentFrequency::Monthly);
        assert!(wrapped.validate().is_err());
        assert!(early_payoff_analysis(&wrapped.with_extra_payment(100.0)).is_err());

        assert!(periodic_payment(25_000.0, 0.01, u32::MAX).is_err());
        assert!(LoanTerms::new(25_000.0, 8.5, 101.0, PaymentFrequency::Monthly).validate().is_err());
    }

    #[test]
    fn test_longest_term_is_accepted() {
        assert_eq!(max_term_periods(PaymentFrequency::Weekly), 5_200);
        let weekly = LoanTerms::new(400_000.0, 4.0, 100.0, PaymentFrequency::Weekly);
        assert!(weekly.validate().is_ok());
        let schedule = generate_schedule(&weekly).unwrap();
        assert_eq!(schedule.number_of_payments, 5_200);
        assert!(schedule.payment > 0.0);
    }

    #[test]
    fn test_tiny_extra_payment_keeps_term() {
        // A cent per period saves interest but never a whole payment
        let payoff = early_payoff_analysis(&car_loan().with_extra_payment(0.01)).unwrap();
        assert_eq!(payoff.accelerated.number_of_payments, 60);
        assert_eq!(payoff.periods_saved, 0);
        assert!(payoff.interest_saved > 0.0);
    }

    proptest! {
        #[test]
        fn prop_schedule_retires_principal(
            principal in 1_000.0f64..1_000_000.0,
            rate in 0.0f64..20.0,
            periods in 1u32..480,
        ) {
            let terms = LoanTerms::with_periods(principal, rate, periods, PaymentFrequency::Monthly);
            let schedule = generate_schedule(&terms).unwrap();
            let principal_paid: f64 = schedule.entries.iter().map(|e| e.principal).sum();
            prop_assert_eq!(schedule.number_of_payments, periods as usize);
            prop_assert!((principal_paid - principal).abs() < 0.01);
            prop_assert!(schedule.final_balance.abs() < 0.01);
        }

        #[test]
        fn prop_extra_payment_never_lengthens(
            principal in 1_000.0f64..500_000.0,
            rate in 0.5f64..15.0,
            extra in 1.0f64..500.0,
        ) {
            let terms = LoanTerms::new(principal, rate, 15.0, PaymentFrequency::Monthly).with_extra_payment(extra);
            let payoff = early_payoff_analysis(&terms).unwrap();
            prop_assert!(payoff.accelerated.number_of_payments <= payoff.baseline.number_of_payments);
            prop_assert!(payoff.interest_saved > 0.0);
        }
    }
}
