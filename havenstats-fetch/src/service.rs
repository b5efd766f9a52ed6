//! Statistics service trait and request types.
//!
//! A service wraps one remote endpoint: it owns its client configuration
//! and its cache slot, and turns the remote payload into a core model.

use async_trait::async_trait;
use havenstats_core::ServiceKind;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheStatus;
use crate::error::FetchError;

// ============================================================================
// Fetch Request
// ============================================================================

/// Per-call options for [`StatsService::fetch`].
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Serve a fresh cached result instead of calling the network.
    pub use_cache: bool,
    /// Aborts the call when cancelled.
    pub cancel: CancellationToken,
}

impl FetchRequest {
    /// A cache-aware request with its own cancellation token.
    pub fn new() -> Self {
        Self {
            use_cache: true,
            cancel: CancellationToken::new(),
        }
    }

    /// Skips the cache lookup. The result is still stored.
    pub fn bypass_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Sets whether the cache may be used.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Uses the given cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fails with [`FetchError::Cancelled`] if the request was cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cancelled`] once the token has fired.
    pub fn ensure_active(&self) -> Result<(), FetchError> {
        if self.cancel.is_cancelled() {
            Err(FetchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Service Info
// ============================================================================

/// Summary of a service for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    /// Service identifier.
    pub id: String,
    /// What the service provides.
    pub kind: ServiceKind,
    /// Human-readable name.
    pub name: String,
    /// Whether all required settings are present.
    pub configured: bool,
    /// Cache slot status.
    pub cache: CacheStatus,
}

// ============================================================================
// Stats Service Trait
// ============================================================================

/// A source of one statistic.
///
/// ## Implementing a Service
///
/// ```ignore
/// #[async_trait]
/// impl StatsService for DataUsageService {
///     type Output = UsageSeries;
///
///     fn id(&self) -> &str {
///         "arkiv.usage"
///     }
///
///     fn kind(&self) -> ServiceKind {
///         ServiceKind::DataUsage
///     }
///
///     async fn fetch(&self, request: &FetchRequest) -> Result<UsageSeries, FetchError> {
///         self.cache
///             .get_or_fetch(request.use_cache, || self.load(&request.cancel))
///             .await
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait StatsService: Send + Sync + 'static {
    /// The derived model this service produces.
    type Output: Clone + Default + Send + Sync + 'static;

    /// Unique identifier (e.g. `"lit.metrics"`).
    fn id(&self) -> &str;

    /// The statistic this service provides.
    fn kind(&self) -> ServiceKind;

    /// Human-readable name.
    fn display_name(&self) -> String {
        let kind = self.kind();
        format!("{} ({})", kind.display_name(), kind.source_name())
    }

    /// Whether every required setting is present.
    ///
    /// Unconfigured services fail fast with
    /// [`FetchError::Configuration`] and make no network call.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetches and derives the statistic.
    ///
    /// With `request.use_cache` a fresh cached result is returned without a
    /// network call. Successful results are always stored.
    async fn fetch(&self, request: &FetchRequest) -> Result<Self::Output, FetchError>;

    /// Empties the cache slot.
    fn clear_cache(&self);

    /// Describes the cache slot.
    fn cache_status(&self) -> CacheStatus;

    /// Summary for listings.
    fn info(&self) -> ServiceInfo {
        ServiceInfo {
            id: self.id().to_string(),
            kind: self.kind(),
            name: self.display_name(),
            configured: self.is_configured(),
            cache: self.cache_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = FetchRequest::new();
        assert!(request.use_cache);
        assert!(request.ensure_active().is_ok());

        let request = request.bypass_cache();
        assert!(!request.use_cache);

        request.cancel.cancel();
        assert_eq!(request.ensure_active(), Err(FetchError::Cancelled));
    }
}
