//! Domain error model.

use thiserror::Error;

/// Result type used across the local domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Local, deterministic failure.
///
/// Only covers what the client can decide on its own (malformed input,
/// violated local invariants). Everything the remote API decides is reported
/// through the client's `ApiError` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A local invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Message without the error-kind prefix, suitable for inline form text.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg) | DomainError::InvariantViolation(msg) => msg,
        }
    }
}
