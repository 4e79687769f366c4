use rust_decimal::Decimal;
use thiserror::Error;

use stockroom_core::DomainError;

use crate::store::StoreError;

/// Error returned by the adjustment engine and the catalog service.
///
/// Domain failures keep their kind; every storage problem (including timeouts)
/// collapses into `StorageFailure`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("product not found")]
    NotFound,

    #[error("variation not found: {0}")]
    VariationNotFound(String),

    #[error("invalid adjustment type: {0}")]
    InvalidAdjustmentType(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient stock: available {available}, requested delta {requested}")]
    InsufficientStock { available: Decimal, requested: Decimal },

    /// The storage call failed or timed out. A timed-out increment may still
    /// have been applied.
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::VariationNotFound(name) => ServiceError::VariationNotFound(name),
            DomainError::InvalidAdjustmentType(tag) => ServiceError::InvalidAdjustmentType(tag),
        }
    }
}
