//! Filecoin Pay subgraph parser.

use chrono::{DateTime, Utc};
use havenstats_core::{
    DEFAULT_TOKEN_DECIMALS, TokenAmount, TokenLedger, TokenLedgerSnapshot, TokenRecord,
};
use havenstats_fetch::FetchError;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::api::{RawToken, token_alias};
use super::config::TokenConfig;
use crate::json::NumberOrString;

/// Dashboard data: alias to token record (`null` when unknown).
pub type DashboardData = HashMap<String, Option<RawToken>>;

/// Converts one raw token into a typed record.
///
/// Missing decimals default to 18 and missing amounts to 0.
pub fn parse_token(raw: &RawToken) -> Result<TokenRecord, FetchError> {
    let decimals = match &raw.decimals {
        Some(value) => {
            let decimals = value.as_u64("decimals")?;
            u32::try_from(decimals)
                .map_err(|_| FetchError::Schema(format!("decimals out of range: {decimals}")))?
        }
        None => DEFAULT_TOKEN_DECIMALS,
    };

    Ok(TokenRecord {
        decimals,
        settled_amount: amount(raw.total_settled_amount.as_ref())?,
        one_time_payment_amount: amount(raw.total_one_time_payment.as_ref())?,
        locked_amount: amount(raw.lockup_current.as_ref())?,
        user_funds: amount(raw.user_funds.as_ref())?,
        lockup_rate: amount(raw.lockup_rate.as_ref())?,
        lockup_last_settled_until_epoch: raw
            .lockup_last_settled_until_epoch
            .as_ref()
            .map(|v| v.as_u64("lockupLastSettledUntilEpoch"))
            .transpose()?
            .unwrap_or(0),
    })
}

fn amount(value: Option<&NumberOrString>) -> Result<TokenAmount, FetchError> {
    match value {
        Some(v) => Ok(TokenAmount::parse(&v.as_text())?),
        None => Ok(TokenAmount::ZERO),
    }
}

/// Builds the ledger snapshot for `tokens` from the dashboard data.
///
/// A `null` record yields an all-zero entry; a missing alias means the
/// response does not match the query.
pub fn parse_dashboard(
    data: &DashboardData,
    tokens: &[TokenConfig],
    captured_at: DateTime<Utc>,
) -> Result<TokenLedgerSnapshot, FetchError> {
    let mut ledgers = Vec::with_capacity(tokens.len());

    for (index, token) in tokens.iter().enumerate() {
        let alias = token_alias(index);
        let entry = data
            .get(&alias)
            .ok_or_else(|| FetchError::Schema(format!("response is missing {alias}")))?;

        let ledger = match entry {
            Some(raw) => TokenLedger::from_record(&token.symbol, &token.address, parse_token(raw)?)?,
            None => {
                debug!(symbol = %token.symbol, "Token not indexed, reporting zeros");
                TokenLedger::missing(&token.symbol, &token.address)
            }
        };
        ledgers.push(ledger);
    }

    Ok(TokenLedgerSnapshot {
        tokens: ledgers,
        captured_at,
    })
}

/// `_meta` block of the health query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaStatus {
    /// Latest indexed block.
    pub block_number: Option<u64>,
    /// Whether the indexer reported errors.
    pub has_indexing_errors: bool,
}

/// Reads the `_meta` block of the health query.
pub fn parse_meta(data: &Value) -> Result<MetaStatus, FetchError> {
    let meta = data
        .get("_meta")
        .filter(|m| !m.is_null())
        .ok_or_else(|| FetchError::Schema("missing _meta".to_string()))?;

    let block_number = match meta.get("block").and_then(|b| b.get("number")) {
        Some(Value::Null) | None => None,
        Some(raw) => {
            let value: NumberOrString = serde_json::from_value(raw.clone())?;
            Some(value.as_u64("_meta.block.number")?)
        }
    };

    Ok(MetaStatus {
        block_number,
        has_indexing_errors: meta
            .get("hasIndexingErrors")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filecoin_pay::config::FilecoinPayConfig;

    fn dashboard(json: &str) -> DashboardData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_dashboard_scenario() {
        let data = dashboard(
            r#"{
                "tokenA": {
                    "decimals": "18",
                    "totalSettledAmount": "1000000000000000000",
                    "totalOneTimePayment": "500000000000000000",
                    "userFunds": "9000000000000000000",
                    "lockupCurrent": "250000000000000000",
                    "lockupRate": "1000",
                    "lockupLastSettledUntilEpoch": "5123456"
                },
                "tokenB": null
            }"#,
        );
        let snapshot =
            parse_dashboard(&data, &FilecoinPayConfig::default().tokens, Utc::now()).unwrap();

        let usdfc = snapshot.token("USDFC").unwrap();
        assert!(usdfc.found);
        assert_eq!(usdfc.display_total_transacted().unwrap(), "1.50");
        assert_eq!(usdfc.display_locked().unwrap(), "0.25");
        assert_eq!(usdfc.lockup_last_settled_until_epoch, 5_123_456);

        let fil = snapshot.token("FIL").unwrap();
        assert!(!fil.found);
        assert!(fil.total_transacted.is_zero());
    }

    #[test]
    fn test_missing_fields_default() {
        let record = parse_token(&RawToken::default()).unwrap();
        assert_eq!(record.decimals, 18);
        assert!(record.settled_amount.is_zero());
        assert_eq!(record.lockup_last_settled_until_epoch, 0);
    }

    #[test]
    fn test_numeric_decimals_accepted() {
        let raw: RawToken =
            serde_json::from_str(r#"{"decimals": 6, "totalSettledAmount": "1234567"}"#).unwrap();
        let record = parse_token(&raw).unwrap();
        assert_eq!(record.decimals, 6);
        assert_eq!(record.settled_amount.display(6).unwrap(), "1.23");
    }

    #[test]
    fn test_bad_amount_is_schema_error() {
        let raw: RawToken = serde_json::from_str(r#"{"totalSettledAmount": "-1"}"#).unwrap();
        assert!(matches!(parse_token(&raw), Err(FetchError::Schema(_))));
    }

    #[test]
    fn test_missing_alias_is_schema_error() {
        let data = dashboard(r#"{"tokenA": null}"#);
        let result = parse_dashboard(&data, &FilecoinPayConfig::default().tokens, Utc::now());
        assert!(matches!(result, Err(FetchError::Schema(msg)) if msg.contains("tokenB")));
    }

    #[test]
    fn test_parse_meta() {
        let data: Value = serde_json::from_str(
            r#"{"_meta": {"block": {"number": 4800123, "timestamp": 1700000000}, "hasIndexingErrors": false}}"#,
        )
        .unwrap();
        let meta = parse_meta(&data).unwrap();
        assert_eq!(meta.block_number, Some(4_800_123));
        assert!(!meta.has_indexing_errors);

        assert!(parse_meta(&Value::Null).is_err());
    }
}
