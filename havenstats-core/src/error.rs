//! Core error types for `HavenStats`.

use thiserror::Error;

/// Core error type for derivation and parsing of statistics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Input data violates a model invariant.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Arithmetic left the representable range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Unknown service name.
    #[error("Unknown service: {0}")]
    UnknownService(String),
}
