//! Stock adjustment engine.
//!
//! ```text
//! Adjustment
//!   ↓
//! 1. Resolve delta (UNIT/WEIGHT: the value itself; VARIATION: read product,
//!    look up the variation weight)
//!   ↓
//! 2. Atomic relative increment in storage (floor-checked when a floor is set)
//!   ↓
//! 3. Post-update product
//! ```
//!
//! The engine keeps no state between calls and takes no locks; all coordination
//! happens inside the store's increment. The VARIATION read is not part of that
//! atomic step, so a sale racing a variation edit may use the previous weight.
//!
//! There is no retry. Adjustments are not idempotent: a caller retrying after a
//! `StorageFailure` (timeouts included) may apply the delta twice.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use stockroom_core::ProductId;
use stockroom_inventory::{Adjustment, Product, StockPolicy};

use crate::error::ServiceError;
use crate::store::{bounded, IncrementOutcome, ProductStore, DEFAULT_STORAGE_TIMEOUT};

/// Applies stock adjustments against a [`ProductStore`].
#[derive(Debug, Clone)]
pub struct AdjustmentEngine<S> {
    store: S,
    policy: StockPolicy,
    storage_timeout: Duration,
}

impl<S> AdjustmentEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: StockPolicy::default(),
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> AdjustmentEngine<S>
where
    S: ProductStore,
{
    /// Apply one adjustment and return the updated product.
    #[instrument(skip(self, adjustment), fields(product_id = %id, kind = %adjustment.kind()))]
    pub async fn adjust(&self, id: ProductId, adjustment: &Adjustment) -> Result<Product, ServiceError> {
        let result = self.apply(id, adjustment).await;
        match &result {
            Ok(product) => info!(quantity = %product.quantity, "stock adjusted"),
            Err(e) => warn!(error = %e, "stock adjustment rejected"),
        }
        result
    }

    async fn apply(&self, id: ProductId, adjustment: &Adjustment) -> Result<Product, ServiceError> {
        let delta = self.resolve_delta(id, adjustment).await?;
        let floor = self.policy.floor_for(delta);

        let outcome = bounded(
            self.storage_timeout,
            self.store.increment_quantity(id, delta, floor),
        )
        .await?;

        match outcome {
            IncrementOutcome::Applied(product) => {
                info!(delta = %delta, "increment committed");
                Ok(product)
            }
            IncrementOutcome::NotFound => Err(ServiceError::NotFound),
            IncrementOutcome::BelowFloor { available } => Err(ServiceError::InsufficientStock {
                available,
                requested: delta,
            }),
            IncrementOutcome::Overflow { available } => Err(ServiceError::Validation(format!(
                "delta {delta} overflows quantity {available}"
            ))),
        }
    }

    async fn resolve_delta(&self, id: ProductId, adjustment: &Adjustment) -> Result<Decimal, ServiceError> {
        if let Some(delta) = adjustment.direct_delta() {
            return Ok(delta);
        }

        let product = bounded(self.storage_timeout, self.store.get(id))
            .await?
            .ok_or(ServiceError::NotFound)?;
        Ok(adjustment.resolve_delta(&product)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use serde_json::json;
    use stockroom_inventory::{ProductDraft, Unit, Variation, VariationSale};

    use super::*;
    use crate::store::{InMemoryProductStore, StoreError};

    fn setup() -> AdjustmentEngine<Arc<InMemoryProductStore>> {
        AdjustmentEngine::new(Arc::new(InMemoryProductStore::new()))
    }

    async fn seed(engine: &AdjustmentEngine<Arc<InMemoryProductStore>>, draft: ProductDraft) -> Product {
        engine.store().insert(draft).await.unwrap()
    }

    fn adjustment(tag: &str, value: serde_json::Value) -> Adjustment {
        Adjustment::from_tagged(tag, value).unwrap()
    }

    #[tokio::test]
    async fn unit_sale_decrements_quantity() {
        let engine = setup();
        let rice = seed(&engine, ProductDraft::new("Rice").with_quantity(dec!(10))).await;

        let updated = engine.adjust(rice.id, &adjustment("UNIT", json!(-3))).await.unwrap();
        assert_eq!(updated.quantity, dec!(7));
    }

    #[tokio::test]
    async fn fractional_weight_sale_is_exact() {
        let engine = setup();
        let flour = seed(
            &engine,
            ProductDraft::new("Flour").with_quantity(dec!(5.0)).with_unit(Unit::Weight),
        )
        .await;

        let updated = engine
            .adjust(flour.id, &adjustment("WEIGHT", json!(-0.5)))
            .await
            .unwrap();
        assert_eq!(updated.quantity, dec!(4.5));

        // Ten 0.1 kg sales land on exactly 3.5, no float drift.
        for _ in 0..10 {
            engine
                .adjust(flour.id, &adjustment("WEIGHT", json!(-0.1)))
                .await
                .unwrap();
        }
        let after = engine.store().get(flour.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, dec!(3.5));
    }

    #[tokio::test]
    async fn variation_sale_removes_pack_weight() {
        let engine = setup();
        let coffee = seed(
            &engine,
            ProductDraft::new("Coffee")
                .with_quantity(dec!(10.0))
                .with_variation(Variation::new("Pouch250", dec!(0.25))),
        )
        .await;

        let updated = engine
            .adjust(
                coffee.id,
                &adjustment("VARIATION", json!({"name": "Pouch250", "quantitySold": 2})),
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, dec!(9.5));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found_for_every_kind() {
        let engine = setup();
        let other = seed(&engine, ProductDraft::new("Rice").with_quantity(dec!(10))).await;
        let missing = ProductId::new();

        let cases = [
            adjustment("UNIT", json!(1)),
            adjustment("WEIGHT", json!(-0.5)),
            Adjustment::Variation(VariationSale::new("Pouch250", dec!(1))),
        ];
        for adj in &cases {
            let err = engine.adjust(missing, adj).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFound), "{adj:?} -> {err:?}");
        }

        let untouched = engine.store().get(other.id).await.unwrap().unwrap();
        assert_eq!(untouched.quantity, dec!(10));
        assert_eq!(engine.store().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_variation_leaves_stock_unchanged() {
        let engine = setup();
        let coffee = seed(
            &engine,
            ProductDraft::new("Coffee")
                .with_quantity(dec!(10.0))
                .with_variation(Variation::new("Pouch250", dec!(0.25))),
        )
        .await;

        let err = engine
            .adjust(
                coffee.id,
                &Adjustment::Variation(VariationSale::new("Pouch500", dec!(1))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::VariationNotFound(name) if name == "Pouch500"));

        let after = engine.store().get(coffee.id).await.unwrap().unwrap();
        assert_eq!(after, coffee);
    }

    #[tokio::test]
    async fn concurrent_adjustments_all_land() {
        let engine = Arc::new(setup());
        let p = seed(&engine, ProductDraft::new("Rice").with_quantity(dec!(100))).await;
        let id = p.id;

        let mut handles = Vec::new();
        for i in 0..200 {
            let engine = engine.clone();
            let delta = if i % 4 == 0 { json!(1) } else { json!(-1) };
            handles.push(tokio::spawn(async move {
                engine.adjust(id, &adjustment("UNIT", delta)).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // 50 restocks, 150 sales.
        let after = engine.store().get(p.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, dec!(0));
    }

    #[tokio::test]
    async fn opposite_concurrent_adjustments_cancel_out() {
        let engine = Arc::new(setup());
        let p = seed(&engine, ProductDraft::new("Rice").with_quantity(dec!(5))).await;

        let (sale, restock) = (Adjustment::Unit(dec!(-1)), Adjustment::Unit(dec!(1)));
        let (a, b) = tokio::join!(engine.adjust(p.id, &sale), engine.adjust(p.id, &restock));
        a.unwrap();
        b.unwrap();

        let after = engine.store().get(p.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, dec!(5));
    }

    #[tokio::test]
    async fn floor_rejects_oversell_without_writing() {
        let engine = setup().with_policy(StockPolicy::with_floor(Decimal::ZERO));
        let p = seed(&engine, ProductDraft::new("Rice").with_quantity(dec!(1))).await;

        let err = engine.adjust(p.id, &Adjustment::Unit(dec!(-2))).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientStock { available, requested }
                if available == dec!(1) && requested == dec!(-2)
        ));
        assert_eq!(engine.store().get(p.id).await.unwrap().unwrap().quantity, dec!(1));

        let ok = engine.adjust(p.id, &Adjustment::Unit(dec!(-1))).await.unwrap();
        assert_eq!(ok.quantity, dec!(0));
    }

    #[tokio::test]
    async fn without_floor_stock_may_go_negative() {
        let engine = setup();
        let p = seed(&engine, ProductDraft::new("Rice").with_quantity(dec!(1))).await;
        let updated = engine.adjust(p.id, &Adjustment::Unit(dec!(-3))).await.unwrap();
        assert_eq!(updated.quantity, dec!(-2));
    }

    #[tokio::test]
    async fn out_of_range_delta_is_a_validation_error() {
        let engine = setup();
        let p = seed(&engine, ProductDraft::new("Rice").with_quantity(Decimal::MAX)).await;

        let err = engine.adjust(p.id, &Adjustment::Unit(dec!(1))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("overflows")));
        assert_eq!(engine.store().get(p.id).await.unwrap().unwrap().quantity, Decimal::MAX);
    }

    /// A store whose calls never finish.
    struct StalledStore;

    #[async_trait::async_trait]
    impl ProductStore for StalledStore {
        async fn list_by_name(&self) -> Result<Vec<Product>, StoreError> {
            std::future::pending().await
        }

        async fn get(&self, _id: ProductId) -> Result<Option<Product>, StoreError> {
            std::future::pending().await
        }

        async fn insert(&self, _draft: ProductDraft) -> Result<Product, StoreError> {
            std::future::pending().await
        }

        async fn replace(
            &self,
            _id: ProductId,
            _draft: ProductDraft,
        ) -> Result<Option<Product>, StoreError> {
            std::future::pending().await
        }

        async fn delete(&self, _id: ProductId) -> Result<bool, StoreError> {
            std::future::pending().await
        }

        async fn increment_quantity(
            &self,
            _id: ProductId,
            _delta: Decimal,
            _floor: Option<Decimal>,
        ) -> Result<IncrementOutcome, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn storage_timeout_is_a_storage_failure() {
        let engine = AdjustmentEngine::new(StalledStore).with_storage_timeout(Duration::from_millis(20));

        let err = engine
            .adjust(ProductId::new(), &Adjustment::Unit(dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::StorageFailure(StoreError::Timeout(_))));

        let err = engine
            .adjust(
                ProductId::new(),
                &Adjustment::Variation(VariationSale::new("Pouch", dec!(1))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::StorageFailure(StoreError::Timeout(_))));
    }
}
