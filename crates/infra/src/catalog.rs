//! Catalog operations: list, get, create, replace, delete.
//!
//! Thin pass-through over the store. Drafts are validated before anything is
//! written; replace is a full overwrite of every mutable field.

use std::time::Duration;

use tracing::{info, instrument};

use stockroom_core::ProductId;
use stockroom_inventory::{Product, ProductDraft};

use crate::error::ServiceError;
use crate::store::{bounded, ProductStore, DEFAULT_STORAGE_TIMEOUT};

#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
    storage_timeout: Duration,
}

impl<S> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}

impl<S> CatalogService<S>
where
    S: ProductStore,
{
    /// All products, ascending by name.
    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(bounded(self.storage_timeout, self.store.list_by_name()).await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        bounded(self.storage_timeout, self.store.get(id))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, ServiceError> {
        draft.validate()?;
        let product = bounded(self.storage_timeout, self.store.insert(draft)).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn replace(&self, id: ProductId, draft: ProductDraft) -> Result<Product, ServiceError> {
        draft.validate()?;
        let product = bounded(self.storage_timeout, self.store.replace(id, draft))
            .await?
            .ok_or(ServiceError::NotFound)?;
        info!("product replaced");
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: ProductId) -> Result<(), ServiceError> {
        if bounded(self.storage_timeout, self.store.delete(id)).await? {
            info!("product deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}
