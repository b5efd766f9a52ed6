//! Data usage series.
//!
//! The chart endpoint reports cumulative bytes per day. This module turns
//! that into per-day deltas and the aggregate figures shown on the page.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::round_to;
use crate::error::CoreError;

/// Bytes per gigabyte (binary, 2^30).
pub const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Decimal places for aggregate totals.
const TOTAL_PRECISION: u32 = 2;

/// Decimal places for per-day figures.
const DAILY_PRECISION: u32 = 4;

// ============================================================================
// Raw Input
// ============================================================================

/// One cumulative observation as reported by the chart endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeSample {
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Total bytes stored as of the end of the period.
    pub cumulative_bytes: u64,
}

impl CumulativeSample {
    /// Creates a new sample.
    pub fn new(period_start: NaiveDate, period_end: NaiveDate, cumulative_bytes: u64) -> Self {
        Self {
            period_start,
            period_end,
            cumulative_bytes,
        }
    }
}

// ============================================================================
// Usage Point & Series
// ============================================================================

/// One day of the usage series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsagePoint {
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Total bytes as of this period.
    pub cumulative_bytes: u64,
    /// Bytes added since the previous period (0 for the first point).
    pub delta_bytes: i64,
    /// Cumulative size in GB, 4 decimals.
    pub cumulative_gb: f64,
    /// Growth in GB, 4 decimals.
    pub delta_gb: f64,
}

/// Chronological usage series with derived aggregates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageSeries {
    /// Points ordered by period ascending.
    pub points: Vec<UsagePoint>,
    /// Last cumulative value in bytes.
    pub total_bytes: u64,
    /// Sum of all deltas in bytes.
    pub total_growth_bytes: i64,
    /// Mean delta over all points but the first, in bytes.
    pub average_daily_growth_bytes: f64,
    /// Last cumulative value in GB, 2 decimals.
    pub total_gb: f64,
    /// Mean daily growth in GB, 4 decimals.
    pub average_daily_growth_gb: f64,
    /// Total growth in GB, 2 decimals.
    pub total_growth_gb: f64,
    /// When the series was computed.
    pub captured_at: DateTime<Utc>,
}

impl UsageSeries {
    /// Derives a series from cumulative samples.
    ///
    /// Samples are ordered by period start first. The first point has no
    /// prior reference, so its delta is defined as 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Overflow`] if a delta does not fit in an `i64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_cumulative(
        mut samples: Vec<CumulativeSample>,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        samples.sort_by_key(|s| s.period_start);

        let mut points = Vec::with_capacity(samples.len());
        let mut previous_cumulative: u64 = 0;
        let mut growth_sum: i128 = 0;

        for (index, sample) in samples.into_iter().enumerate() {
            let delta = if index == 0 {
                0
            } else {
                i128::from(sample.cumulative_bytes) - i128::from(previous_cumulative)
            };
            let delta_bytes = i64::try_from(delta).map_err(|_| {
                CoreError::Overflow(format!("daily delta for {}", sample.period_start))
            })?;
            previous_cumulative = sample.cumulative_bytes;
            growth_sum += delta;

            points.push(UsagePoint {
                period_start: sample.period_start,
                period_end: sample.period_end,
                cumulative_bytes: sample.cumulative_bytes,
                delta_bytes,
                cumulative_gb: round_to(bytes_to_gb(sample.cumulative_bytes as f64), DAILY_PRECISION),
                delta_gb: round_to(bytes_to_gb(delta_bytes as f64), DAILY_PRECISION),
            });
        }

        let total_bytes = points.last().map_or(0, |p| p.cumulative_bytes);
        let total_growth_bytes = i64::try_from(growth_sum)
            .map_err(|_| CoreError::Overflow("total growth".to_string()))?;

        let growth_days = points.len().saturating_sub(1);
        let average_daily_growth_bytes = if growth_days > 0 {
            growth_sum as f64 / growth_days as f64
        } else {
            0.0
        };

        Ok(Self {
            points,
            total_bytes,
            total_growth_bytes,
            average_daily_growth_bytes,
            total_gb: round_to(bytes_to_gb(total_bytes as f64), TOTAL_PRECISION),
            average_daily_growth_gb: round_to(
                bytes_to_gb(average_daily_growth_bytes),
                DAILY_PRECISION,
            ),
            total_growth_gb: round_to(bytes_to_gb(total_growth_bytes as f64), TOTAL_PRECISION),
            captured_at,
        })
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the most recent point.
    pub fn latest(&self) -> Option<&UsagePoint> {
        self.points.last()
    }

    /// Daily growth in GB for every point after the first (chart input).
    pub fn daily_growth_gb(&self) -> Vec<f64> {
        self.points.iter().skip(1).map(|p| p.delta_gb).collect()
    }
}

fn bytes_to_gb(bytes: f64) -> f64 {
    bytes / BYTES_PER_GB
}

// ============================================================================
// Tests
// ============================================================================
