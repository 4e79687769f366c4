use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use stockroom_core::ProductId;
use stockroom_inventory::{Product, ProductDraft};

/// Storage operation error.
///
/// These are **infrastructure errors** (connectivity, timeouts, undecodable
/// rows) as opposed to domain errors. Lookups that find nothing are not errors
/// at this layer; they surface as `None` / `false` / [`IncrementOutcome::NotFound`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("corrupt product record: {0}")]
    Corrupt(String),
}

/// Result of an atomic quantity increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The delta landed; carries the post-update document.
    Applied(Product),
    /// No product with that identifier.
    NotFound,
    /// The delta would have crossed the floor; nothing was written.
    BelowFloor { available: Decimal },
    /// The new quantity is outside the representable range; nothing was written.
    Overflow { available: Decimal },
}

/// Product document store.
///
/// ## Atomicity
///
/// `increment_quantity` must be a single relative update at the storage layer
/// (never read-modify-write in the caller), so that concurrent increments on the
/// same product all take effect. When `floor` is given, the floor check happens
/// inside that same atomic step.
///
/// Every other field is only written by `insert` / `replace`, which overwrite the
/// whole document.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by name (ascending).
    async fn list_by_name(&self) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Insert a new document. The store assigns the identifier.
    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError>;

    /// Overwrite all mutable fields. `None` if the product does not exist.
    async fn replace(&self, id: ProductId, draft: ProductDraft)
    -> Result<Option<Product>, StoreError>;

    /// Returns `false` if nothing was deleted.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    async fn increment_quantity(
        &self,
        id: ProductId,
        delta: Decimal,
        floor: Option<Decimal>,
    ) -> Result<IncrementOutcome, StoreError>;
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn list_by_name(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_by_name().await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        (**self).insert(draft).await
    }

    async fn replace(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>, StoreError> {
        (**self).replace(id, draft).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn increment_quantity(
        &self,
        id: ProductId,
        delta: Decimal,
        floor: Option<Decimal>,
    ) -> Result<IncrementOutcome, StoreError> {
        (**self).increment_quantity(id, delta, floor).await
    }
}
