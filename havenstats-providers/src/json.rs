//! Lenient JSON scalars.
//!
//! The remote services are inconsistent about quoting numbers: the chart
//! endpoint sends byte counts as strings, the subgraph sends `BigInt`s as
//! strings and the status service sends plain numbers. [`NumberOrString`]
//! accepts either form.

use havenstats_fetch::FetchError;
use serde::Deserialize;

/// A JSON value that may be a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    /// A JSON number.
    Number(serde_json::Number),
    /// A quoted value.
    String(String),
}

impl NumberOrString {
    /// Reads a non-negative integer.
    ///
    /// Integral floats (`12.0`) are accepted; anything else is a schema
    /// error naming `field`.
    pub fn as_u64(&self, field: &str) -> Result<u64, FetchError> {
        let parsed = match self {
            Self::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < 1.8e19)
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let value = f as u64;
                        value
                    })
            }),
            Self::String(s) => s.trim().parse::<u64>().ok(),
        };
        parsed.ok_or_else(|| {
            FetchError::Schema(format!("{field}: expected a non-negative integer, got {self}"))
        })
    }

    /// Reads a finite number. Strings may carry a trailing `%`.
    pub fn as_f64(&self, field: &str) -> Result<f64, FetchError> {
        let parsed = match self {
            Self::Number(n) => n.as_f64(),
            Self::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        };
        parsed.filter(|f| f.is_finite()).ok_or_else(|| {
            FetchError::Schema(format!("{field}: expected a number, got {self}"))
        })
    }

    /// Returns the raw text, for big integers parsed elsewhere.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.trim().to_string(),
        }
    }
}

impl std::fmt::Display for NumberOrString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}
