//! Service identity types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

/// The statistics sources behind the live stats widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Cumulative data usage by day (Arkiv indexer chart).
    DataUsage,
    /// Execution success counters (Lit status service).
    ExecutionMetrics,
    /// Token ledger totals (Filecoin Pay subgraph).
    TokenLedger,
}

impl ServiceKind {
    /// Returns all service kinds in display order.
    pub fn all() -> &'static [ServiceKind] {
        &[Self::DataUsage, Self::ExecutionMetrics, Self::TokenLedger]
    }

    /// Returns the display name for this service.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DataUsage => "Data Usage",
            Self::ExecutionMetrics => "Execution Metrics",
            Self::TokenLedger => "Token Ledger",
        }
    }

    /// Returns the network that serves this statistic.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::DataUsage => "Arkiv Network",
            Self::ExecutionMetrics => "Lit Protocol",
            Self::TokenLedger => "Filecoin Pay",
        }
    }

    /// Returns the CLI name (lowercase, no spaces).
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::DataUsage => "usage",
            Self::ExecutionMetrics => "metrics",
            Self::TokenLedger => "ledger",
        }
    }

    /// Default time-to-live of the cached result.
    pub fn default_cache_ttl(&self) -> Duration {
        match self {
            Self::DataUsage => Duration::from_secs(60 * 60),
            Self::ExecutionMetrics | Self::TokenLedger => Duration::from_secs(5 * 60),
        }
    }

    /// Default interval between background refreshes.
    pub fn default_poll_interval(&self) -> Duration {
        self.default_cache_ttl()
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ServiceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| {
                kind.cli_name() == needle || kind.source_name().to_lowercase() == needle
            })
            .or(match needle.as_str() {
                "arkiv" => Some(Self::DataUsage),
                "lit" => Some(Self::ExecutionMetrics),
                "filecoin" | "filecoin-pay" | "usdfc" => Some(Self::TokenLedger),
                _ => None,
            })
            .ok_or_else(|| CoreError::UnknownService(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        assert_eq!(
            ServiceKind::DataUsage.default_cache_ttl(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            ServiceKind::ExecutionMetrics.default_cache_ttl(),
            Duration::from_secs(300)
        );
        assert_eq!(
            ServiceKind::TokenLedger.default_cache_ttl(),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("usage".parse::<ServiceKind>().unwrap(), ServiceKind::DataUsage);
        assert_eq!("Lit".parse::<ServiceKind>().unwrap(), ServiceKind::ExecutionMetrics);
        assert_eq!(
            "filecoin pay".parse::<ServiceKind>().unwrap(),
            ServiceKind::TokenLedger
        );
        assert!("storage".parse::<ServiceKind>().is_err());
    }
}
