use std::sync::Arc;

use anyhow::Context;

use stockroom_infra::store::{InMemoryProductStore, PostgresProductStore, ProductStore};
use stockroom_infra::{AdjustmentEngine, AppConfig, CatalogService};

/// Store handle shared by the engine and the catalog.
pub type SharedStore = Arc<dyn ProductStore>;

/// Services injected into every handler.
///
/// Built once at startup; the store behind it is the only shared resource.
#[derive(Clone)]
pub struct AppServices {
    engine: AdjustmentEngine<SharedStore>,
    catalog: CatalogService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore, config: &AppConfig) -> Self {
        let engine = AdjustmentEngine::new(store.clone())
            .with_policy(config.stock_policy)
            .with_storage_timeout(config.storage_timeout);
        let catalog = CatalogService::new(store).with_storage_timeout(config.storage_timeout);
        Self { engine, catalog }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()), config)
    }

    pub fn engine(&self) -> &AdjustmentEngine<SharedStore> {
        &self.engine
    }

    pub fn catalog(&self) -> &CatalogService<SharedStore> {
        &self.catalog
    }
}

/// Pick the store from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on restart");
        return Ok(AppServices::in_memory(config));
    };

    let store = PostgresProductStore::connect(
        url,
        config.database_max_connections,
        config.storage_timeout,
    )
    .await
    .context("failed to connect to postgres")?;
    store
        .ensure_schema()
        .await
        .context("failed to prepare the products table")?;

    tracing::info!("using postgres product store");
    Ok(AppServices::new(Arc::new(store), config))
}
