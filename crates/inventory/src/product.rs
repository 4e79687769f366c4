use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ProductId};

/// How a product's `quantity` is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    /// Whole, countable units.
    #[default]
    Unit,
    /// Kilograms (fractional quantities are expected).
    Weight,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Unit => "UNIT",
            Unit::Weight => "WEIGHT",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNIT" => Ok(Unit::Unit),
            "WEIGHT" => Ok(Unit::Weight),
            other => Err(DomainError::validation(format!(
                "unit must be one of: UNIT, WEIGHT (got {other:?})"
            ))),
        }
    }
}

/// A named, fixed-weight packaging of a product (e.g. a 250g pouch).
///
/// Variations have no identity of their own: they live and die with the
/// parent product document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub name: String,
    /// Kilograms represented by one unit of this variation.
    pub weight_kg: Decimal,
}

impl Variation {
    pub fn new(name: impl Into<String>, weight_kg: Decimal) -> Self {
        Self {
            name: name.into(),
            weight_kg,
        }
    }
}

/// A stored product document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Product {
    /// Look up a variation by exact name.
    pub fn variation(&self, name: &str) -> DomainResult<&Variation> {
        self.variations
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| DomainError::variation_not_found(name))
    }
}

/// The mutable field set of a product, as supplied to create/replace.
///
/// Everything except `id` is here; storage assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub variations: Vec<Variation>,
}

impl ProductDraft {
    /// A draft with the creation defaults: zero stock, counted in units, no variations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: Decimal::ZERO,
            unit: Unit::default(),
            variations: Vec::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variations.push(variation);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let mut seen = HashSet::with_capacity(self.variations.len());
        for v in &self.variations {
            if v.name.trim().is_empty() {
                return Err(DomainError::validation("variation name cannot be empty"));
            }
            if v.weight_kg <= Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "variation {:?} must have a positive weightKg",
                    v.name
                )));
            }
            if !seen.insert(v.name.as_str()) {
                return Err(DomainError::validation(format!(
                    "duplicate variation name {:?}",
                    v.name
                )));
            }
        }

        Ok(())
    }

    /// Materialize the draft into a product document with the given identifier.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            variations: self.variations,
        }
    }
}
