//! Domain models for `HavenStats`.
//!
//! ## Submodules
//!
//! - [`service`] - Service identity (`ServiceKind`)
//! - [`usage`] - Data usage series (`UsageSeries`, `UsagePoint`)
//! - [`metrics`] - Execution metrics (`ExecutionMetrics`)
//! - [`ledger`] - Token ledger (`TokenLedgerSnapshot`, `TokenAmount`)

mod ledger;
mod metrics;
mod service;
mod usage;

pub use ledger::{
    TokenAmount, TokenLedger, TokenLedgerSnapshot, TokenRecord, DEFAULT_TOKEN_DECIMALS,
    DISPLAY_FRACTION_DIGITS,
};
pub use metrics::{ExecutionCounters, ExecutionMetrics};
pub use service::ServiceKind;
pub use usage::{CumulativeSample, UsagePoint, UsageSeries, BYTES_PER_GB};

/// Rounds `value` to `places` decimal digits, halves away from zero.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod serde_tests;
