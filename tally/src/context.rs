//! Evaluation Context

use tally_finance::{DEFAULT_MAX_PERIODS, REFINANCE_DISCOUNT_RATE};

pub const ENV_MAX_SCHEDULE_PERIODS: &str = "TALLY_MAX_SCHEDULE_PERIODS";
pub const ENV_DISCOUNT_RATE: &str = "TALLY_DISCOUNT_RATE";

/// Settings shared by every calculator in a session
#[derive(Debug, Clone, PartialEq)]
pub struct EvalContext {
    /// Upper bound on amortization schedule length
    pub max_schedule_periods: usize,
    /// Annual percent used to discount refinance savings
    pub refinance_discount_rate: f64,
}

impl EvalContext {
    pub fn new() -> Self {
        Self {
            max_schedule_periods: DEFAULT_MAX_PERIODS,
            refinance_discount_rate: REFINANCE_DISCOUNT_RATE,
        }
    }

    pub fn with_max_schedule_periods(mut self, periods: usize) -> Self {
        self.max_schedule_periods = periods;
        self
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.refinance_discount_rate = rate;
        self
    }

    /// Defaults overridden by `TALLY_MAX_SCHEDULE_PERIODS` and `TALLY_DISCOUNT_RATE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EvalContext::from_env`], reading through `lookup`.
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ctx = Self::new();

        if let Some(raw) = lookup(ENV_MAX_SCHEDULE_PERIODS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => ctx.max_schedule_periods = n,
                _ => tracing::warn!(
                    var = ENV_MAX_SCHEDULE_PERIODS,
                    value = %raw,
                    "ignoring invalid setting"
                ),
            }
        }

        if let Some(raw) = lookup(ENV_DISCOUNT_RATE) {
            match raw.trim().parse::<f64>() {
                Ok(r) if r.is_finite() && r >= 0.0 => ctx.refinance_discount_rate = r,
                _ => tracing::warn!(
                    var = ENV_DISCOUNT_RATE,
                    value = %raw,
                    "ignoring invalid setting"
                ),
            }
        }

        ctx
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
