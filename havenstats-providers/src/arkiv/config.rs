//! Arkiv service configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default indexer API base.
pub const DEFAULT_BASE_URL: &str =
    "https://explorer.mendoza.hoodi.arkiv.network/arkiv-indexer/api/v1";

/// Settings for [`super::DataUsageService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArkivConfig {
    /// Indexer API base, without the trailing `/chart/...`.
    pub base_url: String,
    /// Length of the reported window in days.
    pub days: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Cache TTL in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for ArkivConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            days: 30,
            timeout_secs: 30,
            cache_ttl_secs: 60 * 60,
        }
    }
}

impl ArkivConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the window length.
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
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
