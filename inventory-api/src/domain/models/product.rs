use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single inventory record as persisted in the product collection.
///
/// Identifiers are numeric strings assigned by the store; `created_at`
/// is set once and `updated_at` is refreshed on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body shared by create and update.
///
/// The required fields (`name`, `price`, `quantity`) are optional here
/// so that their absence surfaces as a validation error from the
/// service instead of a deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
}

/// Validated input for `ProductStore::append`.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
}

/// Validated input for `ProductStore::replace`. Optional fields merge
/// over the stored record only when provided.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u32,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
}

/// Aggregate figures over the whole collection, served by the report
/// endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_quantity: u64,
    pub total_value: f64,
    pub out_of_stock: usize,
    pub low_stock: usize,
}
