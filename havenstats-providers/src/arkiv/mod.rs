//! Arkiv Network data usage.
//!
//! Reads the indexer's `chart/data-usage` endpoint, which reports the
//! cumulative bytes stored per day, and derives daily growth from it.

mod api;
mod config;
pub(crate) mod parser;
mod service;

pub use api::{ChartPoint, ChartResponse};
pub use config::ArkivConfig;
pub use service::DataUsageService;
