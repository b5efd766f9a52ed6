//! Lit metrics parser.

use havenstats_core::ExecutionCounters;
use havenstats_fetch::FetchError;

use super::api::MetricsResponse;

/// Extracts the raw counters from a metrics response.
///
/// The two execution counts are required. Uptime falls back to the
/// service's own success rate and then to 0.
pub fn parse_metrics_response(response: &MetricsResponse) -> Result<ExecutionCounters, FetchError> {
    let total_executions = response
        .total_executions
        .as_ref()
        .ok_or_else(|| FetchError::Schema("missing totalExecutions".to_string()))?
        .as_u64("totalExecutions")?;
    let failed_executions = response
        .failed_executions
        .as_ref()
        .ok_or_else(|| FetchError::Schema("missing failedExecutions".to_string()))?
        .as_u64("failedExecutions")?;

    let average_response_time_ms = response
        .average_response_time
        .as_ref()
        .map(|v| v.as_f64("averageResponseTime"))
        .transpose()?
        .unwrap_or(0.0);

    let uptime_percent = match (&response.uptime, &response.success_rate) {
        (Some(uptime), _) => uptime.as_f64("uptime")?,
        (None, Some(rate)) => rate.as_f64("successRate")?,
        (None, None) => 0.0,
    };

    Ok(ExecutionCounters {
        total_executions,
        failed_executions,
        average_response_time_ms,
        uptime_percent,
    })
}
