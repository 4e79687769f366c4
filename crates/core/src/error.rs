//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lookups). Storage concerns belong to the infra crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The product has no variation with the requested name.
    #[error("variation not found: {0}")]
    VariationNotFound(String),

    /// The adjustment tag is not one of the supported kinds.
    #[error("invalid adjustment type: {0}")]
    InvalidAdjustmentType(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn variation_not_found(name: impl Into<String>) -> Self {
        Self::VariationNotFound(name.into())
    }

    pub fn invalid_adjustment_type(tag: impl Into<String>) -> Self {
        Self::InvalidAdjustmentType(tag.into())
    }
}
