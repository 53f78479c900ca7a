//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Raised only while constructing values.
///
/// Transfers themselves never fail with a `DomainError`: they return a (possibly
/// empty) stack or propagate the storage's own error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A durability facet with more wear than its maximum.
    #[error("current wear ({current}) exceeds max wear ({max})")]
    WearExceedsMax { current: u32, max: u32 },

    /// Any other malformed value (break points, decoded keys).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
