//! Filecoin Pay token ledger.
//!
//! Queries the Filecoin Pay subgraph for per-token settlement totals and
//! lockups. Amounts stay exact base-unit integers until display.

mod api;
mod config;
pub(crate) mod parser;
mod service;

pub use api::{GraphQlErrorItem, GraphQlRequest, GraphQlResponse, RawToken};
pub use config::{FIL_ADDRESS, FilecoinPayConfig, TokenConfig, USDFC_ADDRESS};
pub use service::{SubgraphHealth, TokenLedgerService};
