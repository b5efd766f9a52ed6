//! Lit Protocol execution metrics.
//!
//! Reads success and failure counters for the decrypt function from the
//! Lit status service. Requests need a bearer API key; without one the
//! service reports itself unconfigured and never touches the network.

mod api;
mod config;
pub(crate) mod parser;
mod service;

pub use api::MetricsResponse;
pub use config::{API_KEY_ENV, LitConfig};
pub use service::ExecutionMetricsService;
