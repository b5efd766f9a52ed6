//! Arkiv chart API types and request building.

use chrono::{DateTime, Days, Utc};
use havenstats_fetch::FetchError;
use serde::Deserialize;
use url::Url;

use super::config::ArkivConfig;
use crate::json::NumberOrString;

/// Chart endpoint, relative to the API base.
const DATA_USAGE_ENDPOINT: &str = "chart/data-usage";

/// Chart resolution requested.
const RESOLUTION: &str = "DAY";

// ============================================================================
// API Response Types
// ============================================================================

/// Response from the data usage chart endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    /// Chart points; absent when the indexer has nothing to report.
    #[serde(default)]
    pub chart: Option<Vec<ChartPoint>>,
}

/// One chart point.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartPoint {
    /// Start of the period (`YYYY-MM-DD` or RFC 3339).
    pub date: String,
    /// End of the period.
    #[serde(default)]
    pub date_to: Option<String>,
    /// Cumulative bytes, usually as a string.
    pub value: NumberOrString,
}

// ============================================================================
// Request Building
// ============================================================================

/// Builds the chart URL for the `days` ending at `now`.
///
/// The window is `[now - days, now]` in UTC calendar dates.
pub(crate) fn data_usage_url(config: &ArkivConfig, now: DateTime<Utc>) -> Result<Url, FetchError> {
    if config.days == 0 {
        return Err(FetchError::Configuration(
            "arkiv.days must be at least 1".to_string(),
        ));
    }

    let to = now.date_naive();
    let from = to
        .checked_sub_days(Days::new(u64::from(config.days)))
        .ok_or_else(|| FetchError::Configuration(format!("arkiv.days out of range: {}", config.days)))?;

    let base = config.base_url.trim_end_matches('/');
    Url::parse_with_params(
        &format!("{base}/{DATA_USAGE_ENDPOINT}"),
        &[
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("resolution", RESOLUTION.to_string()),
        ],
    )
    .map_err(|e| FetchError::Configuration(format!("invalid arkiv.base_url: {e}")))
}
