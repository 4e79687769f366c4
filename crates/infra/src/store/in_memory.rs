use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use stockroom_core::ProductId;
use stockroom_inventory::{Product, ProductDraft};

use super::r#trait::{IncrementOutcome, ProductStore, StoreError};

/// In-memory product store.
///
/// Intended for tests/dev. Each operation runs under a single lock acquisition,
/// which makes `increment_quantity` atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.products.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list_by_name(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let product = draft.into_product(ProductId::new());
        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn replace(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        match products.get_mut(&id) {
            Some(slot) => {
                *slot = draft.into_product(id);
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        Ok(products.remove(&id).is_some())
    }

    async fn increment_quantity(
        &self,
        id: ProductId,
        delta: Decimal,
        floor: Option<Decimal>,
    ) -> Result<IncrementOutcome, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        let Some(product) = products.get_mut(&id) else {
            return Ok(IncrementOutcome::NotFound);
        };

        let Some(next) = product.quantity.checked_add(delta) else {
            return Ok(IncrementOutcome::Overflow {
                available: product.quantity,
            });
        };

        if let Some(floor) = floor {
            if next < floor {
                return Ok(IncrementOutcome::BelowFloor {
                    available: product.quantity,
                });
            }
        }

        product.quantity = next;
        Ok(IncrementOutcome::Applied(product.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockroom_inventory::{Unit, Variation};

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let store = InMemoryProductStore::new();
        let a = store.insert(ProductDraft::new("A")).await.unwrap();
        let b = store.insert(ProductDraft::new("A")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = InMemoryProductStore::new();
        for name in ["Sugar", "Beans", "Rice", "Apples"] {
            store.insert(ProductDraft::new(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list_by_name()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Apples", "Beans", "Rice", "Sugar"]);
    }

    #[tokio::test]
    async fn replace_overwrites_everything_but_the_id() {
        let store = InMemoryProductStore::new();
        let original = store
            .insert(
                ProductDraft::new("Coffee")
                    .with_quantity(dec!(3))
                    .with_variation(Variation::new("Pouch250", dec!(0.25))),
            )
            .await
            .unwrap();

        let replaced = store
            .replace(
                original.id,
                ProductDraft::new("Coffee beans")
                    .with_quantity(dec!(7.5))
                    .with_unit(Unit::Weight),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(replaced.id, original.id);
        assert_eq!(replaced.name, "Coffee beans");
        assert_eq!(replaced.quantity, dec!(7.5));
        assert_eq!(replaced.unit, Unit::Weight);
        assert!(replaced.variations.is_empty());
    }

    #[tokio::test]
    async fn replace_and_delete_report_missing_products() {
        let store = InMemoryProductStore::new();
        let id = ProductId::new();
        assert_eq!(store.replace(id, ProductDraft::new("X")).await.unwrap(), None);
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn increment_respects_floor() {
        let store = InMemoryProductStore::new();
        let p = store
            .insert(ProductDraft::new("Rice").with_quantity(dec!(1)))
            .await
            .unwrap();

        let outcome = store
            .increment_quantity(p.id, dec!(-2), Some(Decimal::ZERO))
            .await
            .unwrap();
        assert_eq!(outcome, IncrementOutcome::BelowFloor { available: dec!(1) });
        assert_eq!(store.get(p.id).await.unwrap().unwrap().quantity, dec!(1));

        let outcome = store
            .increment_quantity(p.id, dec!(-1), Some(Decimal::ZERO))
            .await
            .unwrap();
        assert!(matches!(outcome, IncrementOutcome::Applied(p) if p.quantity == Decimal::ZERO));
    }

    #[tokio::test]
    async fn increment_past_decimal_range_is_rejected_without_writing() {
        let store = InMemoryProductStore::new();
        let p = store
            .insert(ProductDraft::new("Rice").with_quantity(Decimal::MAX))
            .await
            .unwrap();

        let outcome = store.increment_quantity(p.id, dec!(1), None).await.unwrap();
        assert_eq!(outcome, IncrementOutcome::Overflow { available: Decimal::MAX });
        assert_eq!(store.get(p.id).await.unwrap().unwrap().quantity, Decimal::MAX);
    }

    #[test]
    fn poisoned_lock_is_reported_by_every_call() {
        let store = std::sync::Arc::new(InMemoryProductStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.products.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Backend(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn increment_unknown_product_is_not_found() {
        let store = InMemoryProductStore::new();
        let outcome = store
            .increment_quantity(ProductId::new(), dec!(1), None)
            .await
            .unwrap();
        assert_eq!(outcome, IncrementOutcome::NotFound);
        assert!(store.is_empty().unwrap());
    }
}
