//! End-to-end service tests against mock endpoints.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use havenstats_fetch::{
    CacheState, CancellationToken, Clock, FetchError, FetchRequest, HttpClient, ManualClock,
    RetryStrategy, StatsService,
};
use havenstats_providers::{
    ArkivConfig, DataUsageService, ExecutionMetricsService, FilecoinPayConfig, LitConfig,
    TokenLedgerService,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> HttpClient {
    HttpClient::new().unwrap().with_retry(RetryStrategy::no_retry())
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 30, 9, 30, 0).unwrap())
}

// ============================================================================
// Arkiv
// ============================================================================

fn chart_body() -> serde_json::Value {
    json!({
        "chart": [
            { "date": "2025-04-01", "date_to": "2025-04-02", "value": "1000" },
            { "date": "2025-04-02", "date_to": "2025-04-03", "value": "1500" },
            { "date": "2025-04-03", "date_to": "2025-04-04", "value": "4000" }
        ]
    })
}

fn usage_service(server: &MockServer, clock: &ManualClock) -> DataUsageService {
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    DataUsageService::new(ArkivConfig::default().with_base_url(server.uri()))
        .unwrap()
        .with_clock(shared)
        .with_http(http())
}

#[tokio::test]
async fn test_usage_series_from_chart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chart/data-usage"))
        .and(query_param("from", "2025-03-31"))
        .and(query_param("to", "2025-04-30"))
        .and(query_param("resolution", "DAY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let service = usage_service(&server, &clock());
    let series = service.fetch(&FetchRequest::new()).await.unwrap();

    let deltas: Vec<i64> = series.points.iter().map(|p| p.delta_bytes).collect();
    assert_eq!(deltas, vec![0, 500, 2500]);
    assert_eq!(series.total_bytes, 4000);
    assert_eq!(series.captured_at, clock().now());
}

#[tokio::test]
async fn test_usage_cache_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(2)
        .mount(&server)
        .await;

    let clock = clock();
    let service = usage_service(&server, &clock);

    let first = service.fetch(&FetchRequest::new()).await.unwrap();
    let cached = service.fetch(&FetchRequest::new()).await.unwrap();
    assert_eq!(first, cached);
    assert_eq!(service.cache_status().state, CacheState::Fresh);

    clock.advance(Duration::from_secs(60 * 60));
    assert_eq!(service.cache_status().state, CacheState::Stale);
    service.fetch(&FetchRequest::new()).await.unwrap();
}

#[tokio::test]
async fn test_usage_bypass_and_clear() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(3)
        .mount(&server)
        .await;

    let service = usage_service(&server, &clock());
    service.fetch(&FetchRequest::new()).await.unwrap();
    service.fetch(&FetchRequest::new().bypass_cache()).await.unwrap();

    service.clear_cache();
    assert!(!service.cache_status().has_entry);
    service.fetch(&FetchRequest::new()).await.unwrap();
}

#[tokio::test]
async fn test_usage_http_error_keeps_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = usage_service(&server, &clock());
    service.fetch(&FetchRequest::new()).await.unwrap();

    let err = service
        .fetch(&FetchRequest::new().bypass_cache())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    assert!(service.cache_status().has_entry);
}

#[tokio::test]
async fn test_usage_cancelled_request() {
    let server = MockServer::start().await;
    let service = usage_service(&server, &clock());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = service
        .fetch(&FetchRequest::new().with_cancel(cancel))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Cancelled);
}

#[tokio::test]
async fn test_usage_default_client_calls_once_within_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(800)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = ArkivConfig::default().with_base_url(server.uri());
    config.timeout_secs = 1;
    let service = DataUsageService::new(config).unwrap();

    let started = std::time::Instant::now();
    let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 503, .. }));
    assert!(started.elapsed() < Duration::from_millis(1500));
}

// ============================================================================
// Lit
// ============================================================================

fn metrics_service(server: &MockServer, config: LitConfig) -> ExecutionMetricsService {
    let shared: Arc<dyn Clock> = Arc::new(clock());
    ExecutionMetricsService::new(config.with_base_url(server.uri()))
        .unwrap()
        .with_clock(shared)
        .with_http(http())
}

#[tokio::test]
async fn test_metrics_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = metrics_service(&server, LitConfig::default());
    let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::Configuration(_)));
}

#[tokio::test]
async fn test_metrics_success_rate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/function/error/scmgjqeyfz11rkj72gy5dpdxgy"))
        .and(header("authorization", "Bearer test-key"))
        .and(query_param("startDate", "2025-04-29T09:30:00.000Z"))
        .and(query_param("endDate", "2025-04-30T09:30:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalExecutions": 200,
            "failedExecutions": 4,
            "averageResponseTime": 210.5,
            "uptime": 99.9
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = metrics_service(&server, LitConfig::default().with_api_key("test-key"));
    let metrics = service.fetch(&FetchRequest::new()).await.unwrap();

    assert_eq!(metrics.success_rate_percent, 98.0);
    assert_eq!(metrics.total_executions, 200);
    assert_eq!(metrics.uptime_percent, 99.9);
}

#[tokio::test]
async fn test_metrics_inconsistent_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalExecutions": 3,
            "failedExecutions": 5
        })))
        .mount(&server)
        .await;

    let service = metrics_service(&server, LitConfig::default().with_api_key("k"));
    let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
    assert!(matches!(err, FetchError::Schema(_)));
    assert!(!service.cache_status().has_entry);
}

#[tokio::test]
async fn test_metrics_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let service = metrics_service(&server, LitConfig::default().with_api_key("wrong"));
    let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
}

// ============================================================================
// Filecoin Pay
// ============================================================================

fn ledger_service(server: &MockServer) -> TokenLedgerService {
    let shared: Arc<dyn Clock> = Arc::new(clock());
    TokenLedgerService::new(FilecoinPayConfig::default().with_subgraph_url(server.uri()))
        .unwrap()
        .with_clock(shared)
        .with_http(http())
}

#[tokio::test]
async fn test_ledger_totals() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": {
                "tokenAddressA": "0x80B98d3aa09ffff255c3ba4A241111Ff1262F045",
                "tokenAddressB": "0x0000000000000000000000000000000000000000"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "tokenA": {
                    "decimals": "18",
                    "totalSettledAmount": "1000000000000000000",
                    "totalOneTimePayment": "500000000000000000",
                    "userFunds": "0",
                    "lockupCurrent": "0",
                    "lockupRate": "0",
                    "lockupLastSettledUntilEpoch": "0"
                },
                "tokenB": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ledger_service(&server);
    let snapshot = service.fetch(&FetchRequest::new()).await.unwrap();

    let usdfc = snapshot.token("USDFC").unwrap();
    assert_eq!(usdfc.display_total_transacted().unwrap(), "1.50");
    assert!(!snapshot.token("FIL").unwrap().found);
}

#[tokio::test]
async fn test_ledger_graphql_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Type `Token` has no field `foo`" }]
        })))
        .mount(&server)
        .await;

    let service = ledger_service(&server);
    let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::GraphQl {
            messages: vec!["Type `Token` has no field `foo`".to_string()]
        }
    );
}

#[tokio::test]
async fn test_ledger_errors_win_over_malformed_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "tokenA": { "decimals": [] } },
            "errors": [{ "message": "indexing error" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ledger_service(&server);
    let err = service.fetch(&FetchRequest::new()).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::GraphQl {
            messages: vec!["indexing error".to_string()]
        }
    );
}

#[tokio::test]
async fn test_subgraph_health() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "query": "{ _meta { block { number timestamp } hasIndexingErrors } }"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "_meta": {
                    "block": { "number": 4_812_345, "timestamp": 1_746_000_000 },
                    "hasIndexingErrors": false
                }
            }
        })))
        .mount(&server)
        .await;

    let health = ledger_service(&server)
        .check_health(&CancellationToken::new())
        .await;
    assert!(health.healthy);
    assert_eq!(health.block_number, Some(4_812_345));
}

#[tokio::test]
async fn test_subgraph_health_reports_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let health = ledger_service(&server)
        .check_health(&CancellationToken::new())
        .await;
    assert!(!health.healthy);
    assert!(health.message.contains("503"));
}
