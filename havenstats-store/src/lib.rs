// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `HavenStats` Store
//!
//! Consumer-side state for the `HavenStats` services.
//!
//! This crate provides:
//!
//! - **`StatsPoller`**: Polling hook with loading, error and fallback
//!   flags, change notification, and safe unmount
//! - **`ScheduledTask`**: Cancellable background task handle
//! - **`StatsConfig`**: Per-service settings with JSON persistence
//!
//! ## Usage
//!
//! ```ignore
//! use havenstats_store::{StatsConfig, StatsPoller};
//! use havenstats_core::ServiceKind;
//!
//! let config = StatsConfig::load().await?;
//! let services = config.service_set()?;
//!
//! let poller = StatsPoller::mount(
//!     services.usage.clone(),
//!     config.poller_options(ServiceKind::DataUsage),
//! );
//!
//! let mut rx = poller.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("{:?}", poller.state());
//! }
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod poller;
pub mod schedule;
pub mod state;

pub use config::{PollingConfig, ServiceSection, StatsConfig};
pub use error::StoreError;
pub use persistence::{default_config_dir, default_config_path, load_json, save_json};
pub use poller::{PollerOptions, StatsPoller};
pub use schedule::{ScheduledTask, sleep_or_cancel};
pub use state::{FetchState, FetchStatus};
