//! Risk/return metrics over paired return series
//!
//! Returns are period returns in percent (`1.5` means +1.5%). Risk-free rates
//! passed to the annualized ratios are annual percentages; `alpha` takes a
//! rate already on the same period basis as the returns and does not convert.

use crate::drawdown::downside_deviation;
use crate::helpers::{ratio_or_zero, validate_return_series};
use serde::Serialize;
use tally_core::{MetricsError, Period};
use tally_stats::{correlation, covariance, linear_regression, mean, require_paired, std_dev, variance};

/// Which benchmark periods a capture ratio looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Periods where the benchmark rose
    Up,
    /// Periods where the benchmark fell
    Down,
}

/// Beta: cov(stock, market) / var(market)
///
/// A constant market series carries no information about sensitivity;
/// the result is 0 rather than a division by zero.
pub fn beta(stock: &[f64], market: &[f64]) -> Result<f64, MetricsError> {
    require_paired(stock, market, 2)?;
    let market_variance = variance(market)?;
    if market_variance == 0.0 {
        return Ok(0.0);
    }
    Ok(covariance(stock, market)? / market_variance)
}

/// CAPM alpha: mean(stock) - rf - beta * (mean(market) - rf)
///
/// `risk_free` is a per-period rate in percent, on the same basis as the
/// return series.
pub fn alpha(stock: &[f64], market: &[f64], risk_free: f64) -> Result<f64, MetricsError> {
    let b = beta(stock, market)?;
    Ok(mean(stock)? - risk_free - b * (mean(market)? - risk_free))
}

/// Standard error of the beta estimate.
///
/// sqrt((SSres / (n - 2)) / Σ(m - m̄)²), from the regression of stock on
/// market. Needs at least three observations for a residual degree of
/// freedom.
pub fn standard_error_of_beta(stock: &[f64], market: &[f64]) -> Result<f64, MetricsError> {
    require_paired(stock, market, 3)?;
    let fit = linear_regression(market, stock)?;
    if fit.ss_x == 0.0 {
        return Ok(0.0);
    }
    let residual_variance = fit.ss_res / (fit.n - 2) as f64;
    Ok((residual_variance / fit.ss_x).sqrt())
}

/// Annualized volatility: sample std-dev * sqrt(annualization factor)
pub fn volatility(returns: &[f64], period: Period) -> Result<f64, MetricsError> {
    validate_return_series(returns, 2)?;
    Ok(std_dev(returns)? * period.annualization_factor().sqrt())
}

fn annualized_excess(returns: &[f64], annual_risk_free: f64, period: Period) -> Result<f64, MetricsError> {
    Ok(mean(returns)? * period.annualization_factor() - annual_risk_free)
}

/// Sharpe ratio: (annualized mean - rf) / annualized volatility
pub fn sharpe_ratio(returns: &[f64], annual_risk_free: f64, period: Period) -> Result<f64, MetricsError> {
    let vol = volatility(returns, period)?;
    let excess = annualized_excess(returns, annual_risk_free, period)?;
    Ok(ratio_or_zero(excess, vol))
}

/// Sortino ratio: like Sharpe, but only returns below the per-period
/// risk-free rate count as risk.
pub fn sortino_ratio(returns: &[f64], annual_risk_free: f64, period: Period) -> Result<f64, MetricsError> {
    validate_return_series(returns, 2)?;
    let factor = period.annualization_factor();
    let downside = downside_deviation(returns, annual_risk_free / factor) * factor.sqrt();
    let excess = annualized_excess(returns, annual_risk_free, period)?;
    Ok(ratio_or_zero(excess, downside))
}

/// Share of total risk explained by the market: beta * market volatility
pub fn systematic_risk(beta: f64, market_volatility: f64) -> f64 {
    beta * market_volatility
}

/// Residual risk: sqrt(max(0, total² - systematic²))
pub fn unsystematic_risk(total_volatility: f64, systematic: f64) -> f64 {
    (total_volatility * total_volatility - systematic * systematic)
        .max(0.0)
        .sqrt()
}

/// Treynor ratio: annualized excess return per unit of beta.
/// Zero for non-positive beta.
pub fn treynor_ratio(
    stock: &[f64],
    market: &[f64],
    annual_risk_free: f64,
    period: Period,
) -> Result<f64, MetricsError> {
    let b = beta(stock, market)?;
    if b <= 0.0 {
        return Ok(0.0);
    }
    Ok(annualized_excess(stock, annual_risk_free, period)? / b)
}

fn active_returns(stock: &[f64], benchmark: &[f64]) -> Vec<f64> {
    stock.iter().zip(benchmark).map(|(s, b)| s - b).collect()
}

/// Annualized volatility of the active return (stock - benchmark)
pub fn tracking_error(stock: &[f64], benchmark: &[f64], period: Period) -> Result<f64, MetricsError> {
    require_paired(stock, benchmark, 2)?;
    volatility(&active_returns(stock, benchmark), period)
}

/// Annualized mean active return over tracking error
pub fn information_ratio(stock: &[f64], benchmark: &[f64], period: Period) -> Result<f64, MetricsError> {
    let te = tracking_error(stock, benchmark, period)?;
    let active = mean(&active_returns(stock, benchmark))? * period.annualization_factor();
    Ok(ratio_or_zero(active, te))
}

/// Capture ratio: Σ stock / Σ benchmark over the periods selected by `side`.
///
/// 1.0 means the stock moved exactly with the benchmark in those periods.
/// Zero when no period qualifies.
pub fn capture_ratio(stock: &[f64], benchmark: &[f64], side: Capture) -> Result<f64, MetricsError> {
    require_paired(stock, benchmark, 1)?;
    let (stock_sum, benchmark_sum) = stock
        .iter()
        .zip(benchmark)
        .filter(|(_, b)| match side {
            Capture::Up => **b > 0.0,
            Capture::Down => **b < 0.0,
        })
        .fold((0.0, 0.0), |(s, b), (si, bi)| (s + si, b + bi));
    Ok(ratio_or_zero(stock_sum, benchmark_sum))
}

/// Compounded return of a series of period returns, in percent
pub fn total_return(returns: &[f64]) -> Result<f64, MetricsError> {
    validate_return_series(returns, 1)?;
    let growth = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r / 100.0));
    Ok((growth - 1.0) * 100.0)
}

/// Every risk/return figure for a stock against its market
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub beta: f64,
    /// Per-period alpha, percent
    pub alpha: f64,
    pub annualized_alpha: f64,
    pub correlation: f64,
    pub r_squared: f64,
    pub standard_error: f64,
    /// beta / standard error
    pub t_statistic: f64,
    pub volatility: f64,
    pub market_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub treynor_ratio: f64,
    pub systematic_risk: f64,
    pub unsystematic_risk: f64,
    pub tracking_error: f64,
    pub information_ratio: f64,
    pub up_capture: f64,
    pub down_capture: f64,
    pub total_return: f64,
    pub market_total_return: f64,
    pub observations: usize,
    pub period: Period,
}

/// Compute [`RiskMetrics`] for paired stock and market returns.
///
/// Requires at least three observations so the beta standard error has a
/// residual degree of freedom.
pub fn risk_metrics(
    stock: &[f64],
    market: &[f64],
    annual_risk_free: f64,
    period: Period,
) -> Result<RiskMetrics, MetricsError> {
    require_paired(stock, market, 3)?;
    let factor = period.annualization_factor();

    let b = beta(stock, market)?;
    let a = alpha(stock, market, annual_risk_free / factor)?;
    let fit = linear_regression(market, stock)?;
    let se = standard_error_of_beta(stock, market)?;

    let vol = volatility(stock, period)?;
    let market_vol = volatility(market, period)?;
    let systematic = systematic_risk(b, market_vol);

    let metrics = RiskMetrics {
        beta: b,
        alpha: a,
        annualized_alpha: a * factor,
        correlation: correlation(stock, market)?,
        r_squared: fit.r_squared,
        standard_error: se,
        t_statistic: ratio_or_zero(b, se),
        volatility: vol,
        market_volatility: market_vol,
        sharpe_ratio: sharpe_ratio(stock, annual_risk_free, period)?,
        sortino_ratio: sortino_ratio(stock, annual_risk_free, period)?,
        treynor_ratio: treynor_ratio(stock, market, annual_risk_free, period)?,
        systematic_risk: systematic,
        unsystematic_risk: unsystematic_risk(vol, systematic),
        tracking_error: tracking_error(stock, market, period)?,
        information_ratio: information_ratio(stock, market, period)?,
        up_capture: capture_ratio(stock, market, Capture::Up)?,
        down_capture: capture_ratio(stock, market, Capture::Down)?,
        total_return: total_return(stock)?,
        market_total_return: total_return(market)?,
        observations: stock.len(),
        period,
    };

    tracing::debug!(
        beta = metrics.beta,
        alpha = metrics.alpha,
        r_squared = metrics.r_squared,
        observations = metrics.observations,
        "computed risk metrics"
    );

    Ok(metrics)
}
