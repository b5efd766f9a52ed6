//! Lit status API types and request building.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use havenstats_fetch::FetchError;
use serde::Deserialize;
use url::Url;

use super::config::LitConfig;
use crate::json::NumberOrString;

// ============================================================================
// API Response Types
// ============================================================================

/// Response from the function metrics endpoint.
///
/// Only the counters are read; other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    /// Executions in the window.
    #[serde(default)]
    pub total_executions: Option<NumberOrString>,
    /// Failed executions in the window.
    #[serde(default)]
    pub failed_executions: Option<NumberOrString>,
    /// Mean response time in milliseconds.
    #[serde(default)]
    pub average_response_time: Option<NumberOrString>,
    /// Uptime percentage.
    #[serde(default)]
    pub uptime: Option<NumberOrString>,
    /// Success rate as computed by the service.
    #[serde(default)]
    pub success_rate: Option<NumberOrString>,
}

// ============================================================================
// Request Building
// ============================================================================

/// Builds the metrics URL for the `hours` ending at `now`.
pub(crate) fn metrics_url(config: &LitConfig, now: DateTime<Utc>) -> Result<Url, FetchError> {
    if config.hours == 0 {
        return Err(FetchError::Configuration(
            "lit.hours must be at least 1".to_string(),
        ));
    }

    let start = now - TimeDelta::hours(i64::from(config.hours));
    let base = config.base_url.trim_end_matches('/');
    Url::parse_with_params(
        &format!("{base}/api/function/error/{}", config.function_id),
        &[
            ("startDate", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("endDate", now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ],
    )
    .map_err(|e| FetchError::Configuration(format!("invalid lit.base_url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_url_uses_iso_window() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 12, 0, 0).unwrap();
        let url = metrics_url(&LitConfig::default(), now).unwrap();

        assert_eq!(url.path(), "/api/function/error/scmgjqeyfz11rkj72gy5dpdxgy");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("startDate".to_string(), "2025-05-01T12:00:00.000Z".to_string()),
                ("endDate".to_string(), "2025-05-02T12:00:00.000Z".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_hours_rejected() {
        let config = LitConfig::default().with_hours(0);
        assert!(metrics_url(&config, Utc::now()).is_err());
    }
}
