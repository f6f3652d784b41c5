//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is local and deterministic. Nothing here is retried by the
/// layer that raises it; retry policy (if any) belongs to callers at the edge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input (empty code, negative quantity, bad direction).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record with the same unique key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No record has the requested identifier.
    #[error("not found")]
    NotFound,

    /// A decrease would drive stock below zero.
    #[error("insufficient stock (available: {available}, requested: {requested})")]
    InsufficientStock { available: i64, requested: i64 },

    /// The persistent store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Whether this error means the backing store could not be used.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_both_amounts() {
        let err = DomainError::insufficient_stock(2, 5);
        assert_eq!(
            err.to_string(),
            "insufficient stock (available: 2, requested: 5)"
        );
    }

    #[test]
    fn only_unavailable_reports_unavailable() {
        assert!(DomainError::unavailable("down").is_unavailable());
        assert!(!DomainError::not_found().is_unavailable());
        assert!(!DomainError::conflict("dup").is_unavailable());
    }
}
