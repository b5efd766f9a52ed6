//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use havenstats_core::{DISPLAY_FRACTION_DIGITS, ServiceKind, TokenLedger, TokenLedgerSnapshot};
use havenstats_fetch::{CacheStatus, FetchError, ServiceInfo};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// One service's fetch outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOutput<T> {
    pub service: String,
    pub kind: ServiceKind,
    pub source: &'static str,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cache: CacheStatus,
}

impl<T> ServiceOutput<T> {
    /// Pairs a result with the service that produced it.
    pub fn new(info: ServiceInfo, result: Result<T, FetchError>) -> Self {
        let (data, error) = match result {
            Ok(data) => (Some(data), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            service: info.id,
            kind: info.kind,
            source: info.kind.source_name(),
            configured: info.configured,
            data,
            error,
            cache: info.cache,
        }
    }
}

/// Ledger totals with display strings next to the base units.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerOutput {
    pub tokens: Vec<TokenOutput>,
    pub captured_at: DateTime<Utc>,
}

/// One token's totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOutput {
    pub symbol: String,
    pub address: String,
    pub found: bool,
    pub decimals: u32,
    pub total_transacted: String,
    pub total_transacted_raw: String,
    pub settled_raw: String,
    pub one_time_payment_raw: String,
    pub locked: String,
    pub locked_raw: String,
    pub user_funds_raw: String,
    pub lockup_rate_raw: String,
    pub lockup_last_settled_until_epoch: u64,
}

impl From<&TokenLedgerSnapshot> for LedgerOutput {
    fn from(snapshot: &TokenLedgerSnapshot) -> Self {
        Self {
            tokens: snapshot.tokens.iter().map(TokenOutput::from).collect(),
            captured_at: snapshot.captured_at,
        }
    }
}

impl From<&TokenLedger> for TokenOutput {
    fn from(token: &TokenLedger) -> Self {
        let display = |amount: &havenstats_core::TokenAmount| {
            amount
                .format(token.decimals, DISPLAY_FRACTION_DIGITS)
                .unwrap_or_else(|_| amount.to_string())
        };
        Self {
            symbol: token.symbol.clone(),
            address: token.address.clone(),
            found: token.found,
            decimals: token.decimals,
            total_transacted: display(&token.total_transacted),
            total_transacted_raw: token.total_transacted.to_string(),
            settled_raw: token.settled_amount.to_string(),
            one_time_payment_raw: token.one_time_payment_amount.to_string(),
            locked: display(&token.locked_amount),
            locked_raw: token.locked_amount.to_string(),
            user_funds_raw: token.user_funds.to_string(),
            lockup_rate_raw: token.lockup_rate.to_string(),
            lockup_last_settled_until_epoch: token.lockup_last_settled_until_epoch,
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
