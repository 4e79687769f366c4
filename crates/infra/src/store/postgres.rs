//! Postgres-backed product store.
//!
//! Products live in a single `products` table. Variations are kept inline as a
//! JSONB array, so a product and its variations are always written together.
//!
//! ## Atomic increments
//!
//! `increment_quantity` is one statement:
//!
//! ```text
//! UPDATE products SET quantity = quantity + $delta
//! WHERE id = $id AND ($floor IS NULL OR quantity + $delta >= $floor)
//! RETURNING ...
//! ```
//!
//! Postgres takes a row lock for the update, so concurrent increments on the
//! same product serialize and all land. When no row comes back, a follow-up read
//! tells "not found" apart from "below floor"; that read only feeds the error
//! report and never writes.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Backend` (message includes operation + SQLSTATE) |
//! | PoolClosed / PoolTimedOut | `Backend` |
//! | ColumnDecode / Decode | `Corrupt` |
//! | Other | `Backend` |

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::ProductId;
use stockroom_inventory::{Product, ProductDraft, Unit, Variation};

use super::r#trait::{IncrementOutcome, ProductStore, StoreError};

const PRODUCT_COLUMNS: &str = "id, name, quantity, unit, variations";

/// Postgres-backed product store.
///
/// `Send + Sync`; share it behind an `Arc`. All queries go through the SQLx pool.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table and its name index if they are missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id          UUID PRIMARY KEY,
                name        TEXT NOT NULL,
                quantity    NUMERIC NOT NULL DEFAULT 0,
                unit        TEXT NOT NULL DEFAULT 'UNIT',
                variations  JSONB NOT NULL DEFAULT '[]'::jsonb
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS products_name_idx ON products (name)")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), err)]
    async fn list_by_name(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_by_name", e))?;

        rows.iter().map(row_to_product).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let id = ProductId::new();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (id, name, quantity, unit, variations)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&draft.name)
        .bind(draft.quantity)
        .bind(draft.unit.as_str())
        .bind(Json(&draft.variations))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        row_to_product(&row)
    }

    #[instrument(skip(self, draft), fields(product_id = %id), err)]
    async fn replace(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = $2, quantity = $3, unit = $4, variations = $5
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&draft.name)
        .bind(draft.quantity)
        .bind(draft.unit.as_str())
        .bind(Json(&draft.variations))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace", e))?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_id = %id, delta = %delta), err)]
    async fn increment_quantity(
        &self,
        id: ProductId,
        delta: Decimal,
        floor: Option<Decimal>,
    ) -> Result<IncrementOutcome, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET quantity = quantity + $2
            WHERE id = $1
              AND ($3::numeric IS NULL OR quantity + $2 >= $3)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(delta)
        .bind(floor)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment_quantity", e))?;

        if let Some(row) = row {
            return Ok(IncrementOutcome::Applied(row_to_product(&row)?));
        }

        let current: Option<Decimal> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("increment_quantity", e))?;

        Ok(match current {
            Some(available) if floor.is_some() => IncrementOutcome::BelowFloor { available },
            // Row vanished between the update and the read: a concurrent delete.
            _ => IncrementOutcome::NotFound,
        })
    }
}

fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("decode", e))?;
    let quantity: Decimal = row
        .try_get("quantity")
        .map_err(|e| map_sqlx_error("decode", e))?;
    let unit: String = row.try_get("unit").map_err(|e| map_sqlx_error("decode", e))?;
    let Json(variations): Json<Vec<Variation>> = row
        .try_get("variations")
        .map_err(|e| map_sqlx_error("decode", e))?;

    let unit: Unit = unit
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("product {id}: {e}")))?;

    Ok(Product {
        id: ProductId::from_uuid(id),
        name,
        quantity,
        unit,
        variations,
    })
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::Backend(format!(
                "database error in {operation} (sqlstate {code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("timed out acquiring a connection in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("{operation}: {err}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
