//! Data usage service.

use async_trait::async_trait;
use havenstats_core::{ServiceKind, UsageSeries};
use havenstats_fetch::{
    CacheStatus, CancellationToken, Clock, FetchError, FetchRequest, HttpClient, ResponseCache,
    StatsService, system_clock,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::api::{ChartResponse, data_usage_url};
use super::config::ArkivConfig;
use super::parser::parse_chart_response;

const SERVICE_ID: &str = "arkiv.usage";

/// Daily data usage from the Arkiv indexer.
#[derive(Debug)]
pub struct DataUsageService {
    config: ArkivConfig,
    http: HttpClient,
    cache: ResponseCache<UsageSeries>,
    clock: Arc<dyn Clock>,
}

impl DataUsageService {
    /// Creates the service with the system clock.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: ArkivConfig) -> Result<Self, FetchError> {
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
    pub fn config(&self) -> &ArkivConfig {
        &self.config
    }

    #[instrument(skip(self, cancel), fields(service = SERVICE_ID, days = self.config.days))]
    async fn load(&self, cancel: &CancellationToken) -> Result<UsageSeries, FetchError> {
        let now = self.clock.now();
        let url = data_usage_url(&self.config, now)?;
        debug!(query = url.query().unwrap_or_default(), "Fetching data usage chart");

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let response: ChartResponse = self
            .http
            .get_json(&url, headers, self.config.timeout(), cancel)
            .await?;
        let series = UsageSeries::from_cumulative(parse_chart_response(response)?, now)?;

        info!(
            points = series.len(),
            total_gb = series.total_gb,
            avg_daily_growth_gb = series.average_daily_growth_gb,
            "Fetched data usage"
        );
        Ok(series)
    }
}

#[async_trait]
impl StatsService for DataUsageService {
    type Output = UsageSeries;

    fn id(&self) -> &str {
        SERVICE_ID
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::DataUsage
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<UsageSeries, FetchError> {
        request.ensure_active()?;
        self.cache
            .get_or_fetch(request.use_cache, || self.load(&request.cancel))
            .await
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }
}
