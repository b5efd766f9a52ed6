//! Configuration management.
//!
//! One JSON file with a section per service. Every field has a default,
//! so a missing file or a partial file is fine.
//!
//! ```json
//! {
//!   "arkiv": { "days": 30, "poll_interval_secs": 3600 },
//!   "lit": { "api_key": "...", "enable_polling": false },
//!   "filecoin_pay": { "use_cache": false },
//!   "max_attempts": 1
//! }
//! ```

use havenstats_core::ServiceKind;
use havenstats_fetch::{FetchError, HttpClient, RetryStrategy, system_clock};
use havenstats_providers::{ArkivConfig, FilecoinPayConfig, LitConfig, ServiceSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};
use crate::poller::PollerOptions;

// ============================================================================
// Polling Settings
// ============================================================================

/// Polling settings shared by every section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between background refreshes; the service default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    /// Refresh in the background after the first fetch.
    pub enable_polling: bool,
    /// Serve fresh cached results.
    pub use_cache: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: None,
            enable_polling: true,
            use_cache: true,
        }
    }
}

impl PollingConfig {
    /// Effective interval for `kind`.
    pub fn interval(&self, kind: ServiceKind) -> Duration {
        self.poll_interval_secs
            .map_or_else(|| kind.default_poll_interval(), Duration::from_secs)
    }

    /// Poller options for `kind`.
    pub fn options(&self, kind: ServiceKind) -> PollerOptions {
        PollerOptions::for_service(kind)
            .with_interval(self.interval(kind))
            .with_polling(self.enable_polling)
            .with_cache(self.use_cache)
    }
}

/// A service's own settings plus its polling settings, in one object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceSection<C> {
    /// Endpoint, window, timeout and TTL.
    #[serde(flatten)]
    pub service: C,
    /// Polling behaviour.
    #[serde(flatten)]
    pub polling: PollingConfig,
}

// ============================================================================
// Stats Config
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Arkiv data usage.
    pub arkiv: ServiceSection<ArkivConfig>,
    /// Lit execution metrics.
    pub lit: ServiceSection<LitConfig>,
    /// Filecoin Pay token ledger.
    pub filecoin_pay: ServiceSection<FilecoinPayConfig>,
    /// Attempts per request, all within the request timeout. 1 disables
    /// retries.
    pub max_attempts: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            arkiv: ServiceSection::default(),
            lit: ServiceSection::default(),
            filecoin_pay: ServiceSection::default(),
            max_attempts: 1,
        }
    }
}

impl StatsConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields defaults. The Lit API key falls back to
    /// `LIT_STATUS_API_KEY` when the file has none.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        let config = if path.exists() {
            let config: Self = load_json(path).await?;
            info!(path = %path.display(), "Loaded configuration");
            config
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        let config = config.with_env_fallback();
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Fills the Lit API key from the environment if unset.
    #[must_use]
    pub fn with_env_fallback(mut self) -> Self {
        self.lit.service = self.lit.service.with_env_fallback();
        self
    }

    /// Checks values that would make a service unusable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] naming the first bad field.
    pub fn validate(&self) -> Result<(), StoreError> {
        let checks = [
            ("arkiv.timeout_secs", self.arkiv.service.timeout_secs),
            ("arkiv.days", u64::from(self.arkiv.service.days)),
            ("lit.timeout_secs", self.lit.service.timeout_secs),
            ("lit.hours", u64::from(self.lit.service.hours)),
            ("filecoin_pay.timeout_secs", self.filecoin_pay.service.timeout_secs),
            ("max_attempts", u64::from(self.max_attempts)),
            ("arkiv.poll_interval_secs", self.arkiv.polling.poll_interval_secs.unwrap_or(1)),
            ("lit.poll_interval_secs", self.lit.polling.poll_interval_secs.unwrap_or(1)),
            (
                "filecoin_pay.poll_interval_secs",
                self.filecoin_pay.polling.poll_interval_secs.unwrap_or(1),
            ),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(StoreError::Config(format!("{field} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Poller options for `kind`.
    pub fn poller_options(&self, kind: ServiceKind) -> PollerOptions {
        let polling = match kind {
            ServiceKind::DataUsage => &self.arkiv.polling,
            ServiceKind::ExecutionMetrics => &self.lit.polling,
            ServiceKind::TokenLedger => &self.filecoin_pay.polling,
        };
        polling.options(kind)
    }

    /// Retry strategy for every service.
    pub fn retry_strategy(&self) -> RetryStrategy {
        if self.max_attempts > 1 {
            RetryStrategy::new(self.max_attempts)
        } else {
            RetryStrategy::no_retry()
        }
    }

    /// Builds every service from this configuration.
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be built.
    pub fn service_set(&self) -> Result<ServiceSet, FetchError> {
        let http = HttpClient::new()?.with_retry(self.retry_strategy());
        ServiceSet::with_parts(
            self.arkiv.service.clone(),
            self.lit.service.clone(),
            self.filecoin_pay.service.clone(),
            &system_clock(),
            &http,
        )
    }
}
