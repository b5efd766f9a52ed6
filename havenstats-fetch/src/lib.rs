// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `HavenStats` Fetch
//!
//! Shared fetch and caching infrastructure for the `HavenStats` services.
//!
//! ## Building Blocks
//!
//! - [`http::HttpClient`] - JSON over HTTP with deadlines, cancellation,
//!   retries and typed failures
//! - [`cache::ResponseCache`] - Single-slot TTL cache with ordered writes
//! - [`clock::Clock`] - Injectable wall clock ([`ManualClock`] for tests)
//! - [`service::StatsService`] - Trait implemented by each statistics source
//!
//! ## Example
//!
//! ```ignore
//! use havenstats_fetch::{FetchRequest, StatsService};
//!
//! let request = FetchRequest::new().bypass_cache();
//! let series = usage_service.fetch(&request).await?;
//! ```

pub mod cache;
pub mod clock;
pub mod error;
pub mod http;
pub mod retry;
pub mod service;

// Re-export key types at crate root
pub use cache::{CacheEntry, CacheState, CacheStatus, ResponseCache};
pub use clock::{Clock, ManualClock, SystemClock, system_clock};
pub use error::FetchError;
pub use http::HttpClient;
pub use retry::RetryStrategy;
pub use service::{FetchRequest, ServiceInfo, StatsService};

// Re-exported so dependents share one cancellation type.
pub use tokio_util::sync::CancellationToken;
