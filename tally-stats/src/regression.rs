//! Simple linear regression (ordinary least squares)

use crate::central::mean;
use crate::helpers::{require_min_count, require_same_length, sum_squared_deviations};
use serde::Serialize;
use tally_core::MetricsError;

/// Result of fitting `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to [0, 1]
    pub r_squared: f64,
    /// sign(slope) * sqrt(R²)
    pub r: f64,
    /// Standard error of the estimate, sqrt(SSres / (n - 2)); 0 when n <= 2
    pub std_error: f64,
    /// Sum of squared residuals
    pub ss_res: f64,
    /// Σ(x - x̄)²
    pub ss_x: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit y on x.
///
/// A constant `x` has no defined slope; the fit degrades to the horizontal
/// line through ȳ. A constant `y` leaves nothing to explain, so R² is 0.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearFit, MetricsError> {
    require_same_length(x, y)?;
    require_min_count(x, 2)?;

    let n = x.len();
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let ss_x = sum_squared_deviations(x, mean_x);
    let ss_tot = sum_squared_deviations(y, mean_y);
    let ss_xy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();

    // slope = Σ(x-x̄)(y-ȳ) / Σ(x-x̄)²
    let slope = if ss_x == 0.0 { 0.0 } else { ss_xy / ss_x };
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| {
            let residual = yi - (intercept + slope * xi);
            residual * residual
        })
        .sum();

    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    let r = if slope < 0.0 {
        -r_squared.sqrt()
    } else {
        r_squared.sqrt()
    };

    let std_error = if n > 2 {
        (ss_res / (n - 2) as f64).sqrt()
    } else {
        0.0
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        r,
        std_error,
        ss_res,
        ss_x,
        n,
    })
}

/// Observed minus fitted value for every point
pub fn residuals(x: &[f64], y: &[f64], fit: &LinearFit) -> Result<Vec<f64>, MetricsError> {
    require_same_length(x, y)?;
    Ok(x.iter().zip(y).map(|(xi, yi)| yi - fit.predict(*xi)).collect())
}
