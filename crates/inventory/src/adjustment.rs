//! Stock adjustment requests and delta resolution.
//!
//! An adjustment arrives as a `(tag, value)` pair. The tag selects how `value`
//! is interpreted:
//!
//! | Tag         | `value`                          | Delta                          |
//! |-------------|----------------------------------|--------------------------------|
//! | `UNIT`      | signed number                    | `value`                        |
//! | `WEIGHT`    | signed number (kilograms)        | `value`                        |
//! | `VARIATION` | `{ name, quantitySold }`         | `-(weightKg * quantitySold)`   |
//!
//! `UNIT` and `WEIGHT` share the same arithmetic; the tag records caller intent.
//! Only `VARIATION` needs the product document to resolve its delta.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, DomainResult};

use crate::product::Product;

/// The adjustment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentKind {
    Unit,
    Weight,
    Variation,
}

impl AdjustmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Unit => "UNIT",
            AdjustmentKind::Weight => "WEIGHT",
            AdjustmentKind::Variation => "VARIATION",
        }
    }
}

impl core::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNIT" => Ok(AdjustmentKind::Unit),
            "WEIGHT" => Ok(AdjustmentKind::Weight),
            "VARIATION" => Ok(AdjustmentKind::Variation),
            _ => Err(DomainError::invalid_adjustment_type(s)),
        }
    }
}

/// Payload of a `VARIATION` adjustment: `quantity_sold` packs of variation `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationSale {
    pub name: String,
    pub quantity_sold: Decimal,
}

impl VariationSale {
    pub fn new(name: impl Into<String>, quantity_sold: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity_sold,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("variation name cannot be empty"));
        }
        if self.quantity_sold <= Decimal::ZERO {
            return Err(DomainError::validation("quantitySold must be positive"));
        }
        Ok(())
    }
}

/// A validated stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// Signed delta in whole units.
    Unit(Decimal),
    /// Signed delta in kilograms.
    Weight(Decimal),
    /// Sale of a packaged variation; always decreases stock.
    Variation(VariationSale),
}

impl Adjustment {
    /// Parse a tagged request.
    ///
    /// Unknown tags fail with `InvalidAdjustmentType`; a malformed `value` for a
    /// known tag fails with `Validation`. Neither touches storage.
    pub fn from_tagged(tag: &str, value: JsonValue) -> DomainResult<Self> {
        let kind: AdjustmentKind = tag.parse()?;
        match kind {
            AdjustmentKind::Unit => Ok(Adjustment::Unit(decode_delta(kind, value)?)),
            AdjustmentKind::Weight => Ok(Adjustment::Weight(decode_delta(kind, value)?)),
            AdjustmentKind::Variation => {
                let sale: VariationSale = serde_json::from_value(value).map_err(|e| {
                    DomainError::validation(format!("invalid VARIATION value: {e}"))
                })?;
                sale.validate()?;
                Ok(Adjustment::Variation(sale))
            }
        }
    }

    pub fn kind(&self) -> AdjustmentKind {
        match self {
            Adjustment::Unit(_) => AdjustmentKind::Unit,
            Adjustment::Weight(_) => AdjustmentKind::Weight,
            Adjustment::Variation(_) => AdjustmentKind::Variation,
        }
    }

    /// Delta that can be computed without reading storage.
    ///
    /// `None` for `VARIATION`; use [`Adjustment::resolve_delta`] with the product.
    pub fn direct_delta(&self) -> Option<Decimal> {
        match self {
            Adjustment::Unit(v) | Adjustment::Weight(v) => Some(*v),
            Adjustment::Variation(_) => None,
        }
    }

    /// Compute the quantity delta against a product document.
    pub fn resolve_delta(&self, product: &Product) -> DomainResult<Decimal> {
        match self {
            Adjustment::Unit(v) | Adjustment::Weight(v) => Ok(*v),
            Adjustment::Variation(sale) => {
                let variation = product.variation(&sale.name)?;
                let total_kg = variation
                    .weight_kg
                    .checked_mul(sale.quantity_sold)
                    .ok_or_else(|| DomainError::validation("variation sale weight overflows"))?;
                Ok(-total_kg)
            }
        }
    }
}

fn decode_delta(kind: AdjustmentKind, value: JsonValue) -> DomainResult<Decimal> {
    serde_json::from_value::<Decimal>(value)
        .map_err(|e| DomainError::validation(format!("invalid {kind} value: {e}")))
}
