//! Pollers over the real services, against mock endpoints.

use havenstats_core::ServiceKind;
use havenstats_fetch::{HttpClient, RetryStrategy};
use havenstats_providers::{ArkivConfig, DataUsageService, ExecutionMetricsService, LitConfig};
use havenstats_store::{FetchStatus, PollerOptions, StatsPoller};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http() -> HttpClient {
    HttpClient::new().unwrap().with_retry(RetryStrategy::no_retry())
}

#[tokio::test]
async fn test_metrics_without_key_reports_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = ExecutionMetricsService::new(LitConfig::default().with_base_url(server.uri()))
        .unwrap()
        .with_http(http());
    let poller = StatsPoller::mount(
        Arc::new(service),
        PollerOptions::for_service(ServiceKind::ExecutionMetrics),
    );

    let state = poller.settled().await;
    assert!(!state.is_loading);
    assert_eq!(state.status, FetchStatus::Failed);
    assert!(state.error.unwrap().contains("LIT_STATUS_API_KEY"));
    assert!(!poller.is_configured());
    assert!(poller.is_using_fallback());
}

#[tokio::test]
async fn test_pollers_share_the_service_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chart/data-usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": [
                { "date": "2025-04-01", "value": "1000" },
                { "date": "2025-04-02", "value": "1500" },
                { "date": "2025-04-03", "value": "4000" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = Arc::new(
        DataUsageService::new(ArkivConfig::default().with_base_url(server.uri()))
            .unwrap()
            .with_http(http()),
    );
    let options = PollerOptions::for_service(ServiceKind::DataUsage);

    let first = StatsPoller::mount(Arc::clone(&service), options);
    let series = first.settled().await.data;
    assert_eq!(series.points.len(), 3);
    assert_eq!(series.total_growth_bytes, 3000);

    let second = StatsPoller::mount(Arc::clone(&service), options);
    assert_eq!(second.settled().await.data, series);
}

#[tokio::test]
async fn test_retry_goes_to_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": [{ "date": "2025-04-01", "value": 2048 }]
        })))
        .mount(&server)
        .await;

    let service = DataUsageService::new(ArkivConfig::default().with_base_url(server.uri()))
        .unwrap()
        .with_http(http());
    let poller = StatsPoller::mount(
        Arc::new(service),
        PollerOptions::for_service(ServiceKind::DataUsage).with_polling(false),
    );

    let state = poller.settled().await;
    assert_eq!(state.error.as_deref(), Some("HTTP 502: Bad Gateway"));

    poller.retry().await;
    let state = poller.state();
    assert_eq!(state.error, None);
    assert_eq!(state.data.total_bytes, 2048);
}
