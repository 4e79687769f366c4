//! Stock floor policy.

use rust_decimal::Decimal;

/// Optional lower bound on a product's quantity.
///
/// The base behaviour has no floor: sales may drive stock negative. With a floor
/// configured, decreasing adjustments that would cross it are rejected. Restocks
/// are never rejected, even when the product is already below the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockPolicy {
    pub min_quantity: Option<Decimal>,
}

impl StockPolicy {
    pub fn unbounded() -> Self {
        Self { min_quantity: None }
    }

    pub fn with_floor(min_quantity: Decimal) -> Self {
        Self {
            min_quantity: Some(min_quantity),
        }
    }

    /// The floor storage must enforce for this delta, if any.
    pub fn floor_for(&self, delta: Decimal) -> Option<Decimal> {
        if delta < Decimal::ZERO {
            self.min_quantity
        } else {
            None
        }
    }

}
