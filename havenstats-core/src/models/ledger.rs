//! Token ledger types.
//!
//! Amounts are kept as exact base-unit integers ([`TokenAmount`]) and are
//! only turned into decimal strings at the formatting boundary.

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Decimals assumed when the ledger does not report them.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Fraction digits shown in display strings.
pub const DISPLAY_FRACTION_DIGITS: usize = 2;

// ============================================================================
// Token Amount
// ============================================================================

/// An unsigned token amount in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wraps a raw base-unit value.
    pub const fn new(raw: U256) -> Self {
        Self(raw)
    }

    /// Returns the raw base-unit value.
    pub const fn raw(&self) -> U256 {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parses a base-10 integer string of base units.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] for empty or non-digit input and
    /// [`CoreError::Overflow`] for values beyond 256 bits.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let digits = value.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidData(format!(
                "not a base-10 token amount: {value:?}"
            )));
        }
        U256::from_str_radix(digits, 10)
            .map(Self)
            .map_err(|e| CoreError::Overflow(format!("token amount {digits}: {e}")))
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Overflow`] if the sum exceeds 256 bits.
    pub fn checked_add(self, other: Self) -> Result<Self, CoreError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| CoreError::Overflow(format!("{self} + {other}")))
    }

    /// Formats the amount as a fixed-point decimal string.
    ///
    /// The value is `amount / 10^decimals`. The fraction is truncated (not
    /// rounded) to `fraction_digits`; an all-zero fraction is omitted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Overflow`] if `10^decimals` exceeds 256 bits.
    pub fn format(&self, decimals: u32, fraction_digits: usize) -> Result<String, CoreError> {
        let divisor = scale(decimals)?;
        let integer = self.0 / divisor;
        if decimals == 0 || fraction_digits == 0 {
            return Ok(integer.to_string());
        }

        let fraction = (self.0 % divisor).to_string();
        let width = decimals as usize;
        let padded = format!("{fraction:0>width$}");
        let truncated: String = padded.chars().take(fraction_digits).collect();

        if truncated.bytes().all(|b| b == b'0') {
            Ok(integer.to_string())
        } else {
            Ok(format!("{integer}.{truncated}"))
        }
    }

    /// Formats with the standard display precision.
    ///
    /// # Errors
    ///
    /// See [`TokenAmount::format`].
    pub fn display(&self, decimals: u32) -> Result<String, CoreError> {
        self.format(decimals, DISPLAY_FRACTION_DIGITS)
    }

    /// Parses a decimal string such as `"1.50"` back into base units.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] for malformed input or more
    /// fraction digits than `decimals`, [`CoreError::Overflow`] when the
    /// result exceeds 256 bits.
    pub fn from_decimal_str(value: &str, decimals: u32) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        let (integer, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        if fraction.len() > decimals as usize {
            return Err(CoreError::InvalidData(format!(
                "{value:?} has more than {decimals} fraction digits"
            )));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidData(format!("invalid fraction in {value:?}")));
        }

        let whole = Self::parse(integer)?;
        let unit = scale(decimals)?;
        let mut raw = whole
            .0
            .checked_mul(unit)
            .ok_or_else(|| CoreError::Overflow(format!("{value} * 10^{decimals}")))?;

        if !fraction.is_empty() {
            let missing = decimals - u32::try_from(fraction.len()).unwrap_or(decimals);
            let frac = Self::parse(fraction)?.0 * scale(missing)?;
            raw = raw
                .checked_add(frac)
                .ok_or_else(|| CoreError::Overflow(value.to_string()))?;
        }

        Ok(Self(raw))
    }

    /// Lossy floating point view, for charts only.
    pub fn to_f64(&self, decimals: u32) -> f64 {
        let raw: f64 = self.0.to_string().parse().unwrap_or(0.0);
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let divisor = 10f64.powi(decimals as i32);
        raw / divisor
    }
}

/// Returns `10^decimals`.
fn scale(decimals: u32) -> Result<U256, CoreError> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| CoreError::Overflow(format!("10^{decimals}")))
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Token Record & Ledger
// ============================================================================

/// Raw ledger fields for one token, already parsed from the subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Token decimals.
    pub decimals: u32,
    /// Total settled through payment rails.
    pub settled_amount: TokenAmount,
    /// Total paid as one-time payments.
    pub one_time_payment_amount: TokenAmount,
    /// Currently locked amount.
    pub locked_amount: TokenAmount,
    /// Deposited user funds.
    pub user_funds: TokenAmount,
    /// Lockup rate per epoch.
    pub lockup_rate: TokenAmount,
    /// Epoch up to which lockups are settled.
    pub lockup_last_settled_until_epoch: u64,
}

impl Default for TokenRecord {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_TOKEN_DECIMALS,
            settled_amount: TokenAmount::ZERO,
            one_time_payment_amount: TokenAmount::ZERO,
            locked_amount: TokenAmount::ZERO,
            user_funds: TokenAmount::ZERO,
            lockup_rate: TokenAmount::ZERO,
            lockup_last_settled_until_epoch: 0,
        }
    }
}

/// Ledger figures for one named token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Token symbol (e.g. `USDFC`).
    pub symbol: String,
    /// Token contract address.
    pub address: String,
    /// False when the ledger had no record for the token.
    pub found: bool,
    /// Token decimals.
    pub decimals: u32,
    /// Total settled amount.
    pub settled_amount: TokenAmount,
    /// Total one-time payments.
    pub one_time_payment_amount: TokenAmount,
    /// Settled plus one-time payments.
    pub total_transacted: TokenAmount,
    /// Currently locked amount.
    pub locked_amount: TokenAmount,
    /// Deposited user funds.
    pub user_funds: TokenAmount,
    /// Lockup rate per epoch.
    pub lockup_rate: TokenAmount,
    /// Epoch up to which lockups are settled.
    pub lockup_last_settled_until_epoch: u64,
}

impl TokenLedger {
    /// Builds a ledger entry from a record, deriving the transacted total.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Overflow`] if the total exceeds 256 bits.
    pub fn from_record(
        symbol: impl Into<String>,
        address: impl Into<String>,
        record: TokenRecord,
    ) -> Result<Self, CoreError> {
        let total_transacted = record
            .settled_amount
            .checked_add(record.one_time_payment_amount)?;

        Ok(Self {
            symbol: symbol.into(),
            address: address.into(),
            found: true,
            decimals: record.decimals,
            settled_amount: record.settled_amount,
            one_time_payment_amount: record.one_time_payment_amount,
            total_transacted,
            locked_amount: record.locked_amount,
            user_funds: record.user_funds,
            lockup_rate: record.lockup_rate,
            lockup_last_settled_until_epoch: record.lockup_last_settled_until_epoch,
        })
    }

    /// An all-zero entry for a token the ledger does not know.
    pub fn missing(symbol: impl Into<String>, address: impl Into<String>) -> Self {
        let record = TokenRecord::default();
        Self {
            symbol: symbol.into(),
            address: address.into(),
            found: false,
            decimals: record.decimals,
            settled_amount: TokenAmount::ZERO,
            one_time_payment_amount: TokenAmount::ZERO,
            total_transacted: TokenAmount::ZERO,
            locked_amount: TokenAmount::ZERO,
            user_funds: TokenAmount::ZERO,
            lockup_rate: TokenAmount::ZERO,
            lockup_last_settled_until_epoch: 0,
        }
    }

    /// Display string for the transacted total.
    ///
    /// # Errors
    ///
    /// See [`TokenAmount::format`].
    pub fn display_total_transacted(&self) -> Result<String, CoreError> {
        self.total_transacted.display(self.decimals)
    }

    /// Display string for the locked amount.
    ///
    /// # Errors
    ///
    /// See [`TokenAmount::format`].
    pub fn display_locked(&self) -> Result<String, CoreError> {
        self.locked_amount.display(self.decimals)
    }
}

/// Ledger figures for every tracked token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenLedgerSnapshot {
    /// One entry per tracked token, in configuration order.
    pub tokens: Vec<TokenLedger>,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

impl TokenLedgerSnapshot {
    /// Looks up a token by symbol (case-insensitive).
    pub fn token(&self, symbol: &str) -> Option<&TokenLedger> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Returns true if at least one token had a ledger record.
    pub fn has_records(&self) -> bool {
        self.tokens.iter().any(|t| t.found)
    }
}

// ============================================================================
// Tests
// ============================================================================
