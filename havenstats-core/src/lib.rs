// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `HavenStats` Core
//!
//! Core types, models, and derivation logic for the Haven live statistics.
//!
//! This crate is pure: it performs no I/O. Remote payloads are parsed by the
//! provider crate into the raw inputs defined here, and the constructors in
//! [`models`] turn them into display-ready aggregates.
//!
//! ## Key Types
//!
//! ### Services
//! - [`ServiceKind`] - The three statistics sources shown on the page
//!
//! ### Data Usage
//! - [`UsageSeries`] - Daily usage with cumulative and delta bytes
//! - [`UsagePoint`] - One day of the series
//! - [`CumulativeSample`] - Raw cumulative observation
//!
//! ### Execution Metrics
//! - [`ExecutionMetrics`] - Success rate, counters, latency, uptime
//! - [`ExecutionCounters`] - Raw counters from the status service
//!
//! ### Token Ledger
//! - [`TokenLedgerSnapshot`] - Ledger figures per named token
//! - [`TokenLedger`] - One token's settled, one-time and locked amounts
//! - [`TokenAmount`] - Exact base-unit amount with fixed-point formatting

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Services
    ServiceKind,
    // Data usage
    CumulativeSample,
    UsagePoint,
    UsageSeries,
    BYTES_PER_GB,
    // Execution metrics
    ExecutionCounters,
    ExecutionMetrics,
    // Token ledger
    TokenAmount,
    TokenLedger,
    TokenLedgerSnapshot,
    TokenRecord,
    DEFAULT_TOKEN_DECIMALS,
    DISPLAY_FRACTION_DIGITS,
    // Helpers
    round_to,
};
