//! Filecoin Pay service configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Goldsky-hosted Filecoin Pay mainnet subgraph.
pub const DEFAULT_SUBGRAPH_URL: &str = "https://api.goldsky.com/api/public/project_cmb9tuo8r1xdw01ykb8uidk7h/subgraphs/filecoin-pay-mainnet/1.0.6/gn";

/// USDFC token contract on mainnet.
pub const USDFC_ADDRESS: &str = "0x80B98d3aa09ffff255c3ba4A241111Ff1262F045";

/// Native FIL pseudo-address.
pub const FIL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A token tracked on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Display symbol.
    pub symbol: String,
    /// Token id in the subgraph (contract address).
    pub address: String,
}

impl TokenConfig {
    /// Creates a token entry.
    pub fn new(symbol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            address: address.into(),
        }
    }
}

/// Settings for [`super::TokenLedgerService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilecoinPayConfig {
    /// GraphQL endpoint.
    pub subgraph_url: String,
    /// Tokens to report, in display order.
    pub tokens: Vec<TokenConfig>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Cache TTL in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for FilecoinPayConfig {
    fn default() -> Self {
        Self {
            subgraph_url: DEFAULT_SUBGRAPH_URL.to_string(),
            tokens: vec![
                TokenConfig::new("USDFC", USDFC_ADDRESS),
                TokenConfig::new("FIL", FIL_ADDRESS),
            ],
            timeout_secs: 30,
            cache_ttl_secs: 5 * 60,
        }
    }
}

impl FilecoinPayConfig {
    /// Sets the subgraph URL.
    pub fn with_subgraph_url(mut self, url: impl Into<String>) -> Self {
        self.subgraph_url = url.into();
        self
    }

    /// Replaces the token list.
    pub fn with_tokens(mut self, tokens: Vec<TokenConfig>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
