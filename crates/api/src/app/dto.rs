use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use stockroom_core::DomainResult;
use stockroom_inventory::{Adjustment, ProductDraft, Unit, Variation};

// -------------------------
// Request DTOs
// -------------------------

/// `POST /products`. Only `name` is required.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub quantity: Option<Decimal>,
    pub unit: Option<Unit>,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl CreateProductRequest {
    pub fn into_draft(self) -> ProductDraft {
        let defaults = ProductDraft::new(self.name);
        ProductDraft {
            quantity: self.quantity.unwrap_or(defaults.quantity),
            unit: self.unit.unwrap_or(defaults.unit),
            variations: self.variations,
            ..defaults
        }
    }
}

/// `PUT /products/{id}`: full payload. `name`, `quantity` and `unit` are
/// mandatory; an omitted `variations` list means "no variations".
#[derive(Debug, Deserialize)]
pub struct ReplaceProductRequest {
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl ReplaceProductRequest {
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            variations: self.variations,
        }
    }
}

/// `PATCH /products/{id}`: `{"type": "UNIT" | "WEIGHT" | "VARIATION", "value": ...}`.
///
/// The tag stays a plain string here so that unknown or missing tags surface as
/// `invalid_adjustment_type` rather than a generic body error.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: JsonValue,
}

impl AdjustStockRequest {
    pub fn into_adjustment(self) -> DomainResult<Adjustment> {
        Adjustment::from_tagged(&self.kind, self.value)
    }
}
