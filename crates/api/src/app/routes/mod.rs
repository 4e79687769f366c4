use axum::Router;

pub mod products;
pub mod system;

/// Router for the catalog and stock endpoints.
pub fn router() -> Router {
    Router::new().nest("/products", products::router())
}
