//! Execution metrics service.

use async_trait::async_trait;
use havenstats_core::{ExecutionMetrics, ServiceKind};
use havenstats_fetch::{
    CacheStatus, CancellationToken, Clock, FetchError, FetchRequest, HttpClient, ResponseCache,
    StatsService, system_clock,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::api::{MetricsResponse, metrics_url};
use super::config::{API_KEY_ENV, LitConfig};
use super::parser::parse_metrics_response;

const SERVICE_ID: &str = "lit.metrics";

/// Decrypt execution metrics from the Lit status service.
#[derive(Debug)]
pub struct ExecutionMetricsService {
    config: LitConfig,
    http: HttpClient,
    cache: ResponseCache<ExecutionMetrics>,
    clock: Arc<dyn Clock>,
}

impl ExecutionMetricsService {
    /// Creates the service with the system clock.
    ///
    /// The key is taken from `config` only; call
    /// [`LitConfig::with_env_fallback`] first to honour the environment.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: LitConfig) -> Result<Self, FetchError> {
        let clock = system_clock();
        Ok(Self {
            cache: ResponseCache::with_clock(config.cache_ttl(), Arc::clone(&clock)),
            http: HttpClient::new()?,
            config,
            clock,
        })
    }

    /// Reads time from `clock`. Resets the cache.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = ResponseCache::with_clock(self.config.cache_ttl(), Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LitConfig {
        &self.config
    }

    fn auth_headers(&self) -> Result<HeaderMap, FetchError> {
        let key = self.config.api_key().ok_or_else(|| {
            FetchError::Configuration(format!(
                "Lit status API key missing; set lit.api_key or {API_KEY_ENV}"
            ))
        })?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
            FetchError::Configuration("Lit status API key contains invalid characters".to_string())
        })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    #[instrument(skip(self, headers, cancel), fields(service = SERVICE_ID, hours = self.config.hours))]
    async fn load(
        &self,
        headers: HeaderMap,
        cancel: &CancellationToken,
    ) -> Result<ExecutionMetrics, FetchError> {
        let now = self.clock.now();
        let url = metrics_url(&self.config, now)?;
        debug!("Fetching execution metrics");

        let response: MetricsResponse = self
            .http
            .get_json(&url, headers, self.config.timeout(), cancel)
            .await?;
        let metrics = ExecutionMetrics::from_counters(parse_metrics_response(&response)?, now)?;

        info!(
            total = metrics.total_executions,
            failed = metrics.failed_executions,
            success_rate = metrics.success_rate_percent,
            "Fetched execution metrics"
        );
        Ok(metrics)
    }
}

#[async_trait]
impl StatsService for ExecutionMetricsService {
    type Output = ExecutionMetrics;

    fn id(&self) -> &str {
        SERVICE_ID
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::ExecutionMetrics
    }

    fn is_configured(&self) -> bool {
        self.config.api_key().is_some()
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<ExecutionMetrics, FetchError> {
        request.ensure_active()?;
        let headers = self.auth_headers().inspect_err(|e| {
            warn!(service = SERVICE_ID, error = %e, "Not fetching");
        })?;

        self.cache
            .get_or_fetch(request.use_cache, || self.load(headers, &request.cancel))
            .await
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let service = ExecutionMetricsService::new(LitConfig::default()).unwrap();
        assert!(!service.is_configured());

        let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_auth_header_is_bearer() {
        let service =
            ExecutionMetricsService::new(LitConfig::default().with_api_key("abc123")).unwrap();
        let headers = service.auth_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc123");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }
}
