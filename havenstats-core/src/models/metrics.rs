//! Execution metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::round_to;
use crate::error::CoreError;

/// Decimal places for percentages.
const PERCENT_PRECISION: u32 = 2;

/// Raw counters as supplied by the status service.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExecutionCounters {
    /// Total executions in the window.
    pub total_executions: u64,
    /// Failed executions in the window.
    pub failed_executions: u64,
    /// Mean response time in milliseconds.
    pub average_response_time_ms: f64,
    /// Reported uptime percentage.
    pub uptime_percent: f64,
}

/// Display-ready execution metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Successful share of executions, 0-100.
    pub success_rate_percent: f64,
    /// Total executions.
    pub total_executions: u64,
    /// Failed executions, never more than the total.
    pub failed_executions: u64,
    /// Mean response time in milliseconds.
    pub average_response_time_ms: f64,
    /// Uptime percentage, 0-100.
    pub uptime_percent: f64,
    /// When the metrics were computed.
    pub captured_at: DateTime<Utc>,
}

impl ExecutionMetrics {
    /// Derives metrics from raw counters.
    ///
    /// The success rate is computed from the totals only; with no
    /// executions it is 0. Uptime is clamped to [0, 100].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] if failures exceed the total or
    /// the response time is negative or non-finite.
    pub fn from_counters(
        counters: ExecutionCounters,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if counters.failed_executions > counters.total_executions {
            return Err(CoreError::InvalidData(format!(
                "failedExecutions ({}) exceeds totalExecutions ({})",
                counters.failed_executions, counters.total_executions
            )));
        }
        if !counters.average_response_time_ms.is_finite() || counters.average_response_time_ms < 0.0 {
            return Err(CoreError::InvalidData(format!(
                "averageResponseTime must be a non-negative number, got {}",
                counters.average_response_time_ms
            )));
        }

        let uptime = if counters.uptime_percent.is_finite() {
            counters.uptime_percent.clamp(0.0, 100.0)
        } else {
            0.0
        };

        Ok(Self {
            success_rate_percent: Self::success_rate(
                counters.total_executions,
                counters.failed_executions,
            ),
            total_executions: counters.total_executions,
            failed_executions: counters.failed_executions,
            average_response_time_ms: counters.average_response_time_ms,
            uptime_percent: round_to(uptime, PERCENT_PRECISION),
            captured_at,
        })
    }

    /// Success rate for the given totals, rounded to 2 decimals.
    ///
    /// Returns 0 when there were no executions.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(total_executions: u64, failed_executions: u64) -> f64 {
        if total_executions == 0 {
            return 0.0;
        }
        let succeeded = total_executions.saturating_sub(failed_executions);
        round_to(
            succeeded as f64 / total_executions as f64 * 100.0,
            PERCENT_PRECISION,
        )
    }

    /// Number of successful executions.
    pub fn successful_executions(&self) -> u64 {
        self.total_executions.saturating_sub(self.failed_executions)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(total: u64, failed: u64) -> ExecutionCounters {
        ExecutionCounters {
            total_executions: total,
            failed_executions: failed,
            average_response_time_ms: 120.5,
            uptime_percent: 99.9,
        }
    }

    #[test]
    fn test_success_rate_scenario() {
        let metrics = ExecutionMetrics::from_counters(counters(200, 4), Utc::now()).unwrap();
        assert_eq!(metrics.success_rate_percent, 98.0);
        assert_eq!(metrics.successful_executions(), 196);
    }

    #[test]
    fn test_zero_executions_rate_is_zero() {
        let metrics = ExecutionMetrics::from_counters(counters(0, 0), Utc::now()).unwrap();
        assert_eq!(metrics.success_rate_percent, 0.0);
        assert!(!metrics.success_rate_percent.is_nan());
    }

    #[test]
    fn test_rate_stays_in_range() {
        let cases = [(1, 0), (1, 1), (3, 1), (7, 7), (u64::MAX, 1), (u64::MAX, u64::MAX)];
        for (total, failed) in cases {
            let rate = ExecutionMetrics::success_rate(total, failed);
            assert!((0.0..=100.0).contains(&rate), "{total}/{failed} gave {rate}");
        }
        assert_eq!(ExecutionMetrics::success_rate(3, 1), 66.67);
    }

    #[test]
    fn test_failed_exceeds_total_rejected() {
        let result = ExecutionMetrics::from_counters(counters(5, 6), Utc::now());
        assert!(matches!(result, Err(CoreError::InvalidData(_))));
    }

    #[test]
    fn test_negative_response_time_rejected() {
        let mut raw = counters(10, 1);
        raw.average_response_time_ms = -1.0;
        assert!(ExecutionMetrics::from_counters(raw, Utc::now()).is_err());
    }

    #[test]
    fn test_uptime_clamped() {
        let mut raw = counters(10, 1);
        raw.uptime_percent = 140.0;
        let metrics = ExecutionMetrics::from_counters(raw, Utc::now()).unwrap();
        assert_eq!(metrics.uptime_percent, 100.0);

        raw.uptime_percent = f64::NAN;
        let metrics = ExecutionMetrics::from_counters(raw, Utc::now()).unwrap();
        assert_eq!(metrics.uptime_percent, 0.0);
    }
}
