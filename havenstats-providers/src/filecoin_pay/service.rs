//! Token ledger service.

use async_trait::async_trait;
use havenstats_core::{ServiceKind, TokenLedgerSnapshot};
use havenstats_fetch::{
    CacheStatus, CancellationToken, Clock, FetchError, FetchRequest, HttpClient, ResponseCache,
    StatsService, system_clock,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::api::{GraphQlRequest, GraphQlResponse, HEALTH_QUERY, stats_dashboard_request};
use super::config::FilecoinPayConfig;
use super::parser::{DashboardData, parse_dashboard, parse_meta};

const SERVICE_ID: &str = "filecoin_pay.ledger";

// ============================================================================
// Subgraph Health
// ============================================================================

/// Result of a subgraph health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubgraphHealth {
    /// True if the subgraph answered and reported no indexing errors.
    pub healthy: bool,
    /// Human-readable summary.
    pub message: String,
    /// Latest indexed block, when known.
    pub block_number: Option<u64>,
}

impl SubgraphHealth {
    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: message.into(),
            block_number: None,
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Token ledger totals from the Filecoin Pay subgraph.
#[derive(Debug)]
pub struct TokenLedgerService {
    config: FilecoinPayConfig,
    http: HttpClient,
    cache: ResponseCache<TokenLedgerSnapshot>,
    clock: Arc<dyn Clock>,
}

impl TokenLedgerService {
    /// Creates the service with the system clock.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: FilecoinPayConfig) -> Result<Self, FetchError> {
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
    pub fn config(&self) -> &FilecoinPayConfig {
        &self.config
    }

    fn endpoint(&self) -> Result<Url, FetchError> {
        Url::parse(&self.config.subgraph_url)
            .map_err(|e| FetchError::Configuration(format!("invalid filecoin_pay.subgraph_url: {e}")))
    }

    async fn query<T>(&self, request: &GraphQlRequest, cancel: &CancellationToken) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint()?;
        let response: GraphQlResponse<Value> = self
            .http
            .post_json(&url, request, self.config.timeout(), cancel)
            .await?;
        // `errors` is checked before `data` is given its shape.
        Ok(serde_json::from_value(response.into_data()?)?)
    }

    #[instrument(skip(self, cancel), fields(service = SERVICE_ID, tokens = self.config.tokens.len()))]
    async fn load(&self, cancel: &CancellationToken) -> Result<TokenLedgerSnapshot, FetchError> {
        let now = self.clock.now();
        let request = stats_dashboard_request(&self.config.tokens)?;
        debug!("Querying stats dashboard");

        let data: DashboardData = self.query(&request, cancel).await.inspect_err(|e| {
            if let FetchError::GraphQl { messages } = e {
                warn!(?messages, "Subgraph returned errors");
            }
        })?;
        let snapshot = parse_dashboard(&data, &self.config.tokens, now)?;

        info!(
            tokens = snapshot.tokens.len(),
            found = snapshot.tokens.iter().filter(|t| t.found).count(),
            "Fetched token ledger"
        );
        Ok(snapshot)
    }

    /// Checks the subgraph's indexing status.
    ///
    /// Never fails: any error becomes an unhealthy result carrying the
    /// error message.
    #[instrument(skip(self, cancel), fields(service = SERVICE_ID))]
    pub async fn check_health(&self, cancel: &CancellationToken) -> SubgraphHealth {
        let result = self
            .query::<Value>(&GraphQlRequest::new(HEALTH_QUERY), cancel)
            .await
            .and_then(|data| parse_meta(&data));

        match result {
            Ok(meta) if meta.has_indexing_errors => SubgraphHealth {
                healthy: false,
                message: "Subgraph has indexing errors".to_string(),
                block_number: meta.block_number,
            },
            Ok(meta) => {
                let message = match meta.block_number {
                    Some(block) => format!("Subgraph healthy at block {block}"),
                    None => "Subgraph healthy".to_string(),
                };
                debug!(%message, "Health check passed");
                SubgraphHealth {
                    healthy: true,
                    message,
                    block_number: meta.block_number,
                }
            }
            Err(e) => {
                warn!(error = %e, "Health check failed");
                SubgraphHealth::unhealthy(e.to_string())
            }
        }
    }
}

#[async_trait]
impl StatsService for TokenLedgerService {
    type Output = TokenLedgerSnapshot;

    fn id(&self) -> &str {
        SERVICE_ID
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::TokenLedger
    }

    fn is_configured(&self) -> bool {
        !self.config.tokens.is_empty()
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<TokenLedgerSnapshot, FetchError> {
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
