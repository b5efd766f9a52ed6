//! Arkiv chart parser.

use chrono::{DateTime, NaiveDate};
use havenstats_core::CumulativeSample;
use havenstats_fetch::FetchError;
use tracing::debug;

use super::api::{ChartPoint, ChartResponse};

/// Converts a chart response into cumulative samples.
pub fn parse_chart_response(response: ChartResponse) -> Result<Vec<CumulativeSample>, FetchError> {
    let chart = response
        .chart
        .ok_or_else(|| FetchError::Schema("missing chart array".to_string()))?;
    debug!(points = chart.len(), "Parsing data usage chart");

    chart.into_iter().map(parse_point).collect()
}

fn parse_point(point: ChartPoint) -> Result<CumulativeSample, FetchError> {
    let period_start = parse_date(&point.date)?;
    let period_end = match point.date_to.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => period_start,
    };
    let cumulative_bytes = point.value.as_u64("chart.value")?;

    Ok(CumulativeSample::new(period_start, period_end, cumulative_bytes))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(raw: &str) -> Result<NaiveDate, FetchError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| FetchError::Schema(format!("invalid chart date: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_chart_json(body: &str) -> Result<Vec<CumulativeSample>, FetchError> {
        let response: ChartResponse = serde_json::from_str(body)?;
        parse_chart_response(response)
    }

    #[test]
    fn test_parse_string_values() {
        let json = r#"{
            "chart": [
                {"date": "2025-01-01", "date_to": "2025-01-02", "value": "1000"},
                {"date": "2025-01-02", "date_to": "2025-01-03", "value": "1500"}
            ]
        }"#;
        let samples = parse_chart_json(json).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].cumulative_bytes, 1500);
        assert_eq!(
            samples[0].period_end,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_parse_numeric_values_and_timestamps() {
        let json = r#"{"chart": [{"date": "2025-01-01T00:00:00Z", "value": 4000}]}"#;
        let samples = parse_chart_json(json).unwrap();
        assert_eq!(samples[0].cumulative_bytes, 4000);
        assert_eq!(samples[0].period_start, samples[0].period_end);
    }

    #[test]
    fn test_missing_chart_is_schema_error() {
        assert!(matches!(
            parse_chart_json(r#"{"data": []}"#),
            Err(FetchError::Schema(msg)) if msg.contains("chart")
        ));
    }

    #[test]
    fn test_empty_chart_is_ok() {
        assert!(parse_chart_json(r#"{"chart": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_bad_value_is_schema_error() {
        let json = r#"{"chart": [{"date": "2025-01-01", "value": "lots"}]}"#;
        assert!(matches!(parse_chart_json(json), Err(FetchError::Schema(_))));

        let json = r#"{"chart": [{"date": "2025-01-01", "value": -5}]}"#;
        assert!(matches!(parse_chart_json(json), Err(FetchError::Schema(_))));
    }

    #[test]
    fn test_bad_date_is_schema_error() {
        let json = r#"{"chart": [{"date": "yesterday", "value": "1"}]}"#;
        assert!(matches!(parse_chart_json(json), Err(FetchError::Schema(_))));
    }
}
