// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `HavenStats` Providers
//!
//! The three statistics services behind the Haven live stats.
//!
//! | Service | Source | Transport | Auth | Cache TTL |
//! |---------|--------|-----------|------|-----------|
//! | [`DataUsageService`] | Arkiv indexer | REST (GET) | none | 1 h |
//! | [`ExecutionMetricsService`] | Lit status | REST (GET) | Bearer key | 5 min |
//! | [`TokenLedgerService`] | Filecoin Pay subgraph | GraphQL (POST) | none | 5 min |
//!
//! Each service implements [`havenstats_fetch::StatsService`], owns its own
//! cache slot, and shares nothing with the others.
//!
//! ## Usage
//!
//! ```ignore
//! use havenstats_fetch::{FetchRequest, HttpClient, StatsService, system_clock};
//! use havenstats_providers::ServiceSet;
//!
//! let services = ServiceSet::with_parts(arkiv, lit, filecoin_pay, &system_clock(), &HttpClient::new()?)?;
//! let series = services.usage.fetch(&FetchRequest::new()).await?;
//! ```

pub mod json;
pub mod registry;

// Service modules (alphabetical)
pub mod arkiv;
pub mod filecoin_pay;
pub mod lit;

// Re-export key types
pub use arkiv::{ArkivConfig, DataUsageService};
pub use filecoin_pay::{FilecoinPayConfig, SubgraphHealth, TokenConfig, TokenLedgerService};
pub use lit::{ExecutionMetricsService, LitConfig};
pub use registry::ServiceSet;
