//! Tally Statistics Primitives
//!
//! Moments, covariance, correlation and simple linear regression over `f64`
//! slices. Every variance-like quantity is the sample estimator (n - 1)
//! unless the function name says otherwise. Cardinality problems come back
//! as `MetricsError` rather than NaN.

mod helpers;
mod central;
mod dispersion;
mod bivariate;
mod regression;

pub use helpers::{require_finite, require_min_count, require_paired, require_same_length, sum};
pub use central::mean;
pub use dispersion::{population_variance, std_dev, variance, variance_with_mean};
pub use bivariate::{correlation, covariance};
pub use regression::{linear_regression, residuals, LinearFit};
