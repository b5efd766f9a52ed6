//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

use havenstats_core::CoreError;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
///
/// Every failure a service can report maps onto one of these kinds. The
/// `Display` output is what the poller stores as the user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The remote host could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its deadline and was aborted.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {status_text}")]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
    },

    /// The payload did not have the expected shape.
    #[error("Invalid response: {0}")]
    Schema(String),

    /// The GraphQL endpoint returned an `errors` array.
    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQl {
        /// Messages from the `errors` array.
        messages: Vec<String>,
    },

    /// A required setting (e.g. an API key) is missing.
    #[error("Not configured: {0}")]
    Configuration(String),

    /// The request was superseded or its owner went away.
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Builds an HTTP status error from a status code.
    pub fn http_status(status: reqwest::StatusCode) -> Self {
        Self::HttpStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Returns true if trying again later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Schema(_) | Self::GraphQl { .. } | Self::Configuration(_) | Self::Cancelled => {
                false
            }
        }
    }

    /// Classifies a transport error from reqwest.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Schema(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http_status(status)
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<CoreError> for FetchError {
    fn from(err: CoreError) -> Self {
        Self::Schema(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Network("refused".into()).is_transient());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(FetchError::http_status(reqwest::StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(FetchError::http_status(reqwest::StatusCode::BAD_GATEWAY).is_transient());
        assert!(!FetchError::http_status(reqwest::StatusCode::NOT_FOUND).is_transient());
        assert!(!FetchError::Configuration("no key".into()).is_transient());
        assert!(!FetchError::Cancelled.is_transient());
    }

    #[test]
    fn test_display_messages() {
        let err = FetchError::http_status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");

        let err = FetchError::GraphQl {
            messages: vec!["bad field".into(), "bad arg".into()],
        };
        assert_eq!(err.to_string(), "GraphQL error: bad field; bad arg");
    }

    #[test]
    fn test_core_error_maps_to_schema() {
        let err: FetchError = CoreError::InvalidData("failed > total".into()).into();
        assert!(matches!(err, FetchError::Schema(_)));
    }
}
