//! Infrastructure layer: product storage, the adjustment engine, catalog
//! operations and configuration.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;

pub use catalog::CatalogService;
pub use config::{AppConfig, ConfigError, KeepAliveConfig};
pub use engine::AdjustmentEngine;
pub use error::ServiceError;
