//! Serde tests for core types.
//!
//! These check the JSON shapes the CLI emits and that cached snapshots can
//! be read back without losing precision.

use chrono::{NaiveDate, Utc};

use crate::{
    CumulativeSample, ExecutionCounters, ExecutionMetrics, ServiceKind, TokenAmount, TokenLedger,
    TokenLedgerSnapshot, TokenRecord, UsageSeries,
};

// ============================================================================
// ServiceKind Serde Tests
// ============================================================================

#[test]
fn test_service_kind_serde_all_variants() {
    for kind in ServiceKind::all() {
        let json = serde_json::to_string(kind).unwrap();
        let parsed: ServiceKind = serde_json::from_str(&json).unwrap();
        assert_eq!(*kind, parsed, "Round-trip failed for {kind:?}");
    }
}

#[test]
fn test_service_kind_snake_case() {
    let cases = [
        (r#""data_usage""#, ServiceKind::DataUsage),
        (r#""execution_metrics""#, ServiceKind::ExecutionMetrics),
        (r#""token_ledger""#, ServiceKind::TokenLedger),
    ];
    for (json, expected) in cases {
        let parsed: ServiceKind = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, expected, "Failed for {json}");
    }
    assert!(serde_json::from_str::<ServiceKind>(r#""storage""#).is_err());
}

// ============================================================================
// TokenAmount Serde Tests
// ============================================================================

#[test]
fn test_token_amount_serializes_as_string() {
    let amount = TokenAmount::parse("123456789012345678901234567890").unwrap();
    let json = serde_json::to_string(&amount).unwrap();
    assert_eq!(json, r#""123456789012345678901234567890""#);

    let parsed: TokenAmount = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, amount);
}

#[test]
fn test_token_amount_rejects_numbers_and_garbage() {
    assert!(serde_json::from_str::<TokenAmount>("12").is_err());
    assert!(serde_json::from_str::<TokenAmount>(r#""1.5""#).is_err());
    assert!(serde_json::from_str::<TokenAmount>(r#""""#).is_err());
}

// ============================================================================
// Snapshot Serde Tests
// ============================================================================

#[test]
fn test_ledger_snapshot_roundtrip() {
    let record = TokenRecord {
        settled_amount: TokenAmount::parse("1000000000000000000").unwrap(),
        one_time_payment_amount: TokenAmount::parse("500000000000000000").unwrap(),
        lockup_last_settled_until_epoch: 4_800_000,
        ..TokenRecord::default()
    };
    let snapshot = TokenLedgerSnapshot {
        tokens: vec![
            TokenLedger::from_record("USDFC", "0x80b98d3aa09ffff255c3ba4a241111ff1262f045", record)
                .unwrap(),
            TokenLedger::missing("FIL", "0x0000000000000000000000000000000000000000"),
        ],
        captured_at: Utc::now(),
    };

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: TokenLedgerSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
    assert!(json.contains(r#""total_transacted":"1500000000000000000""#));
}

#[test]
fn test_usage_series_roundtrip() {
    let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
    let series = UsageSeries::from_cumulative(
        vec![
            CumulativeSample::new(day(1), day(2), 1000),
            CumulativeSample::new(day(2), day(3), 2500),
        ],
        Utc::now(),
    )
    .unwrap();

    let json = serde_json::to_string(&series).unwrap();
    let parsed: UsageSeries = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, series);
    assert!(json.contains(r#""period_start":"2025-03-01""#));
}

#[test]
fn test_execution_metrics_roundtrip() {
    let metrics = ExecutionMetrics::from_counters(
        ExecutionCounters {
            total_executions: 200,
            failed_executions: 4,
            average_response_time_ms: 87.25,
            uptime_percent: 99.95,
        },
        Utc::now(),
    )
    .unwrap();

    let json = serde_json::to_string(&metrics).unwrap();
    let parsed: ExecutionMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, metrics);
}
