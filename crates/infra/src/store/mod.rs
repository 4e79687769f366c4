//! Product document storage.

mod r#trait;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use r#trait::{IncrementOutcome, ProductStore, StoreError};

use std::future::Future;
use std::time::Duration;

/// Default per-call storage timeout.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Await a storage call, turning an elapsed deadline into [`StoreError::Timeout`].
///
/// The underlying call is dropped on timeout, but it may already have been
/// applied by the backend.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
