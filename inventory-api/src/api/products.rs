use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::domain::models::product::{Product, ProductInput};
use crate::domain::services::product_service::ProductService;
use crate::error::AppError;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            sku: product.sku,
            category: product.category,
            supplier: product.supplier,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let product_service = ProductService::new(state.clone());

    let products = product_service.list_products().await?;

    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let product_service = ProductService::new(state.clone());

    let product = product_service.get_product(&id).await?;

    Ok(Json(ProductResponse::from(product)))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product_service = ProductService::new(state.clone());

    let product = product_service.create_product(payload).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ProductInput>,
) -> Result<Json<ProductResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let product_service = ProductService::new(state.clone());

    let product = product_service.update_product(&id, payload).await?;

    Ok(Json(ProductResponse::from(product)))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let product_service = ProductService::new(state.clone());

    product_service.delete_product(&id).await?;

    Ok(Json(json!({ "success": true })))
}
