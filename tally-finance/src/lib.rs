//! Tally Finance
//!
//! Risk/return metrics over paired return series, drawdown ratios over value
//! series, the amortization engine with early-payoff analysis, refinance
//! comparison, home equity and rent-versus-buy projections built on the
//! amortization schedule, and capital-gains treatment. Everything is `f64`;
//! rounding to cents is left to the presentation layer.

mod helpers;
pub mod risk;
pub mod drawdown;
pub mod loans;
pub mod refinance;
pub mod equity;
pub mod rent_vs_buy;
pub mod tax;
pub mod analysis;

pub use helpers::{periodic_rate, validate_return_series, validate_value_series};

pub use risk::{
    alpha, beta, capture_ratio, information_ratio, risk_metrics, sharpe_ratio, sortino_ratio,
    standard_error_of_beta, systematic_risk, total_return, tracking_error, treynor_ratio,
    unsystematic_risk, volatility, Capture, RiskMetrics,
};
pub use drawdown::{
    annualized_return, calmar_ratio, compound_annual_growth, downside_deviation,
    drawdown_metrics, max_drawdown, period_returns, recovery_time, Drawdown, DrawdownMetrics,
    RECOVERY_DRAWDOWN_THRESHOLD,
};
pub use loans::{
    early_payoff_analysis, early_payoff_analysis_with_cap, generate_schedule,
    generate_schedule_with_cap, max_term_periods, periodic_payment, project_payoff_date,
    AmortizationEntry, AmortizationSchedule, EarlyPayoff, LoanSummary, LoanTerms, Schedule,
    DEFAULT_MAX_PERIODS, MAX_ANNUAL_RATE, MAX_TERM_YEARS, PAYOFF_EPSILON,
};
pub use refinance::{
    analyze_refinance, analyze_refinance_with_discount, RefinanceAnalysis, RefinanceTerms,
    REFINANCE_DISCOUNT_RATE,
};
pub use equity::{
    cash_out_refinance, equity_breakdown, equity_projection, monthly_equity_build,
    refinancing_options, CashOutRefinance, CashOutTerms, EquityBreakdown, EquityPosition,
    EquityYear, RefinancingOption, BORROWABLE_EQUITY_SHARE, CASH_OUT_CLOSING_COST_RATE,
    CONFORMING_LTV_LIMIT, HELOC_LTV_LIMIT, MAX_APPRECIATION_RATE,
};
pub use rent_vs_buy::{rent_vs_buy, Decision, RentVsBuy, RentVsBuyTerms, RentVsBuyYear, MAX_GROWTH_RATE};
pub use tax::{
    capital_gains, holding_days, is_long_term, CapitalGains, Sale, LONG_TERM_EXCLUSION,
    LONG_TERM_HOLDING_DAYS,
};
pub use analysis::{assess_drawdown, assess_risk, Assessment, PerformanceGrade, RiskLevel};
