//! Inventory domain module.
//!
//! This crate contains the business rules for products and stock adjustments,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod adjustment;
pub mod policy;
pub mod product;

pub use adjustment::{Adjustment, AdjustmentKind, VariationSale};
pub use policy::StockPolicy;
pub use product::{Product, ProductDraft, Unit, Variation};
