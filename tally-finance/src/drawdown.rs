//! Drawdown and ratio functions over a raw value series
//!
//! Values are absolute levels (portfolio value, price, balance) and must be
//! finite and strictly positive. Drawdowns are reported as positive
//! percentages of the running peak.

use crate::helpers::validate_value_series;
use crate::risk::{sharpe_ratio, sortino_ratio, volatility};
use serde::Serialize;
use tally_core::{MetricsError, Period};

/// Drawdown (percent) that counts as "under water" for [`recovery_time`]
pub const RECOVERY_DRAWDOWN_THRESHOLD: f64 = 10.0;

/// Deepest peak-to-trough decline of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawdown {
    /// Percent of the peak, 0 for a non-decreasing series
    pub max_drawdown: f64,
    pub peak_index: usize,
    pub trough_index: usize,
    /// First index after the trough where the peak level is regained
    pub recovery_index: Option<usize>,
}

/// Maximum drawdown in a single forward pass.
pub fn max_drawdown(values: &[f64]) -> Result<Drawdown, MetricsError> {
    validate_value_series(values, 2)?;

    let mut max_dd = 0.0;
    let mut peak_index = 0;
    let mut trough_index = 0;
    let mut current_peak = values[0];
    let mut current_peak_index = 0;

    for (i, &value) in values.iter().enumerate() {
        if value > current_peak {
            current_peak = value;
            current_peak_index = i;
        }
        let dd = (current_peak - value) / current_peak * 100.0;
        if dd > max_dd {
            max_dd = dd;
            peak_index = current_peak_index;
            trough_index = i;
        }
    }

    let recovery_index = if max_dd > 0.0 {
        let peak_value = values[peak_index];
        values
            .iter()
            .enumerate()
            .skip(trough_index + 1)
            .find(|(_, v)| **v >= peak_value)
            .map(|(i, _)| i)
    } else {
        None
    };

    Ok(Drawdown {
        max_drawdown: max_dd,
        peak_index,
        trough_index,
        recovery_index,
    })
}

/// Compound annual growth rate of the series, percent.
///
/// The series spans `n - 1` periods, i.e. `(n - 1) / factor` years.
pub fn annualized_return(values: &[f64], period: Period) -> Result<f64, MetricsError> {
    validate_value_series(values, 2)?;
    let years = (values.len() - 1) as f64 / period.annualization_factor();
    Ok(compound_annual_growth(values[0], values[values.len() - 1], years))
}

/// ((end / start)^(1 / years) - 1) * 100 for positive `start`, `end` and `years`
pub fn compound_annual_growth(start: f64, end: f64, years: f64) -> f64 {
    ((end / start).powf(years.recip()) - 1.0) * 100.0
}

/// Calmar ratio: annualized return / max drawdown.
///
/// A series that never draws down has no risk to divide by; the ratio is
/// exactly 0 in that case regardless of the return.
pub fn calmar_ratio(values: &[f64], period: Period) -> Result<f64, MetricsError> {
    validate_value_series(values, 3)?;
    let dd = max_drawdown(values)?;
    if dd.max_drawdown == 0.0 {
        return Ok(0.0);
    }
    Ok(annualized_return(values, period)? / dd.max_drawdown)
}

/// Longest stretch spent more than [`RECOVERY_DRAWDOWN_THRESHOLD`] below the
/// running peak, in years.
pub fn recovery_time(values: &[f64], period: Period) -> Result<f64, MetricsError> {
    validate_value_series(values, 2)?;

    let mut peak = values[0];
    let mut run = 0usize;
    let mut longest = 0usize;

    for &value in values {
        peak = peak.max(value);
        let dd = (peak - value) / peak * 100.0;
        if dd > RECOVERY_DRAWDOWN_THRESHOLD {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    Ok(longest as f64 / period.annualization_factor())
}

/// Root mean square of shortfalls below `threshold`.
///
/// Only returns strictly below the threshold contribute, and the mean is
/// taken over those returns alone. 0 when nothing falls short.
pub fn downside_deviation(returns: &[f64], threshold: f64) -> f64 {
    let (sum_sq, count) = returns
        .iter()
        .filter(|r| **r < threshold)
        .fold((0.0, 0usize), |(sum, n), r| {
            let diff = r - threshold;
            (sum + diff * diff, n + 1)
        });
    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt()
}

/// Period-over-period returns in percent (one shorter than `values`)
pub fn period_returns(values: &[f64]) -> Result<Vec<f64>, MetricsError> {
    validate_value_series(values, 2)?;
    Ok(values
        .windows(2)
        .map(|w| (w[1] / w[0] - 1.0) * 100.0)
        .collect())
}

/// Drawdown-oriented summary of a value series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownMetrics {
    pub max_drawdown: f64,
    pub peak_index: usize,
    pub trough_index: usize,
    pub recovery_index: Option<usize>,
    pub annualized_return: f64,
    pub total_return: f64,
    pub calmar_ratio: f64,
    pub recovery_time_years: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Annualized, against the per-period risk-free rate
    pub downside_deviation: f64,
    pub observations: usize,
    pub period: Period,
}

pub fn drawdown_metrics(
    values: &[f64],
    period: Period,
    annual_risk_free: f64,
) -> Result<DrawdownMetrics, MetricsError> {
    validate_value_series(values, 3)?;
    let factor = period.annualization_factor();

    let dd = max_drawdown(values)?;
    let returns = period_returns(values)?;
    let first = values[0];
    let last = values[values.len() - 1];

    let metrics = DrawdownMetrics {
        max_drawdown: dd.max_drawdown,
        peak_index: dd.peak_index,
        trough_index: dd.trough_index,
        recovery_index: dd.recovery_index,
        annualized_return: annualized_return(values, period)?,
        total_return: (last / first - 1.0) * 100.0,
        calmar_ratio: calmar_ratio(values, period)?,
        recovery_time_years: recovery_time(values, period)?,
        volatility: volatility(&returns, period)?,
        sharpe_ratio: sharpe_ratio(&returns, annual_risk_free, period)?,
        sortino_ratio: sortino_ratio(&returns, annual_risk_free, period)?,
        downside_deviation: downside_deviation(&returns, annual_risk_free / factor) * factor.sqrt(),
        observations: values.len(),
        period,
    };

    tracing::debug!(
        max_drawdown = metrics.max_drawdown,
        calmar = metrics.calmar_ratio,
        observations = metrics.observations,
        "computed drawdown metrics"
    );

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const PORTFOLIO: [f64; 12] = [
        10000.0, 10200.0, 10100.0, 10300.0, 10250.0, 10400.0, 10350.0, 10500.0, 10600.0, 10500.0,
        10700.0, 10800.0,
    ];

    #[test]
    fn test_max_drawdown() {
        let dd = max_drawdown(&[100.0, 110.0, 95.0, 105.0, 90.0, 115.0]).unwrap();
        assert_eq!(dd.peak_index, 1);
        assert_eq!(dd.trough_index, 4);
        assert_eq!(dd.recovery_index, Some(5));
        // (110 - 90) / 110
        assert_relative_eq!(dd.max_drawdown, 20.0 / 110.0 * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_without_recovery() {
        let dd = max_drawdown(&[100.0, 80.0, 90.0]).unwrap();
        assert_relative_eq!(dd.max_drawdown, 20.0, epsilon = 1e-12);
        assert_eq!(dd.recovery_index, None);
    }

    #[test]
    fn test_max_drawdown_rejects_non_positive() {
        assert_eq!(
            max_drawdown(&[100.0, -5.0]),
            Err(MetricsError::NonPositive { index: 1 })
        );
    }

    #[test]
    fn test_annualized_return() {
        // Doubling over 12 monthly steps is 100% a year
        let mut values = vec![100.0];
        let step = 2f64.powf(1.0 / 12.0);
        for i in 1..=12 {
            values.push(100.0 * step.powi(i));
        }
        assert_relative_eq!(annualized_return(&values, Period::Monthly).unwrap(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(annualized_return(&[100.0, 110.0], Period::Yearly).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compound_annual_growth() {
        assert_relative_eq!(compound_annual_growth(100.0, 121.0, 2.0), 10.0, epsilon = 1e-9);
        assert_relative_eq!(compound_annual_growth(100.0, 50.0, 1.0), -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_calmar_portfolio() {
        let calmar = calmar_ratio(&PORTFOLIO, Period::Monthly).unwrap();
        let dd = max_drawdown(&PORTFOLIO).unwrap();
        assert!(dd.max_drawdown > 0.0);
        assert!(calmar > 0.0 && calmar.is_finite());
    }

    #[test]
    fn test_calmar_monotonic_is_exactly_zero() {
        let values = [10000.0, 10100.0, 10200.0, 10300.0, 10400.0, 10500.0];
        assert_eq!(max_drawdown(&values).unwrap().max_drawdown, 0.0);
        assert_eq!(calmar_ratio(&values, Period::Monthly).unwrap(), 0.0);
    }

    #[test]
    fn test_calmar_needs_three_values() {
        assert_eq!(
            calmar_ratio(&[100.0, 90.0], Period::Monthly),
            Err(MetricsError::InsufficientData { required: 3, actual: 2 })
        );
    }

    #[test]
    fn test_recovery_time() {
        // Under water (>10%) for 3 consecutive months, then 1 more later
        let values = [100.0, 85.0, 80.0, 88.0, 95.0, 100.0, 89.0, 100.0];
        assert_relative_eq!(recovery_time(&values, Period::Monthly).unwrap(), 3.0 / 12.0);
        assert_eq!(recovery_time(&PORTFOLIO, Period::Monthly).unwrap(), 0.0);
    }

    #[test]
    fn test_downside_deviation() {
        assert_eq!(downside_deviation(&[1.0, 2.0], 0.0), 0.0);
        assert_eq!(downside_deviation(&[], 0.0), 0.0);
        // shortfalls -3 and -4 below 0: sqrt((9 + 16) / 2)
        assert_relative_eq!(downside_deviation(&[-3.0, 5.0, -4.0], 0.0), 12.5f64.sqrt());
    }

    #[test]
    fn test_period_returns() {
        let r = period_returns(&[100.0, 110.0, 99.0]).unwrap();
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], -10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_drawdown_metrics_portfolio() {
        let m = drawdown_metrics(&PORTFOLIO, Period::Monthly, 4.5).unwrap();
        assert!(m.max_drawdown > 0.0);
        assert!(m.calmar_ratio > 0.0 && m.calmar_ratio.is_finite());
        assert_relative_eq!(m.total_return, 8.0, epsilon = 1e-9);
        assert_relative_eq!(m.calmar_ratio, m.annualized_return / m.max_drawdown);
        assert!(m.sharpe_ratio.is_finite());
        assert!(m.downside_deviation > 0.0);
        assert_eq!(m.observations, 12);
    }

    proptest! {
        #[test]
        fn prop_increasing_series_has_zero_calmar(
            start in 1.0f64..1e6,
            steps in prop::collection::vec(0.0f64..1000.0, 2..30)
        ) {
            let mut values = vec![start];
            for s in steps {
                let last = values[values.len() - 1];
                values.push(last + s);
            }
            prop_assert_eq!(calmar_ratio(&values, Period::Monthly).unwrap(), 0.0);
        }
    }
}
