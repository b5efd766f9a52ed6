//! Lit status service configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the status API key.
pub const API_KEY_ENV: &str = "LIT_STATUS_API_KEY";

/// Default status service.
pub const DEFAULT_BASE_URL: &str = "https://uptime.getlit.dev";

/// Function whose metrics are reported (the network's decrypt function).
pub const DEFAULT_FUNCTION_ID: &str = "scmgjqeyfz11rkj72gy5dpdxgy";

/// Settings for [`super::ExecutionMetricsService`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LitConfig {
    /// Status service base URL.
    pub base_url: String,
    /// Monitored function identifier.
    pub function_id: String,
    /// Bearer token for the status API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Length of the reported window in hours.
    pub hours: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Cache TTL in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for LitConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            function_id: DEFAULT_FUNCTION_ID.to_string(),
            api_key: None,
            hours: 24,
            timeout_secs: 30,
            cache_ttl_secs: 5 * 60,
        }
    }
}

impl LitConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the window length.
    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    /// Fills a missing key from [`API_KEY_ENV`].
    pub fn with_env_fallback(self) -> Self {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.with_key_fallback(from_env)
    }

    fn with_key_fallback(mut self, fallback: Option<String>) -> Self {
        if self.api_key().is_none() {
            self.api_key = fallback.filter(|key| !key.trim().is_empty());
        }
        self
    }

    /// The API key, if a non-blank one is set.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
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

impl fmt::Debug for LitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LitConfig")
            .field("base_url", &self.base_url)
            .field("function_id", &self.function_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("hours", &self.hours)
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let config = LitConfig::default().with_api_key("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_blank_key_is_absent() {
        assert!(LitConfig::default().with_api_key("   ").api_key().is_none());
        assert_eq!(
            LitConfig::default().with_api_key(" k ").api_key(),
            Some("k")
        );
    }

    #[test]
    fn test_key_fallback_only_when_missing() {
        let config = LitConfig::default().with_key_fallback(Some("env-key".into()));
        assert_eq!(config.api_key(), Some("env-key"));

        let config = LitConfig::default()
            .with_api_key("file-key")
            .with_key_fallback(Some("env-key".into()));
        assert_eq!(config.api_key(), Some("file-key"));

        let config = LitConfig::default().with_key_fallback(Some(String::new()));
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_key_not_serialized_when_absent() {
        let json = serde_json::to_string(&LitConfig::default()).unwrap();
        assert!(!json.contains("api_key"));
    }
}
