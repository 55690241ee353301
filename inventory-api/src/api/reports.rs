use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::domain::models::product::InventorySummary;
use crate::domain::services::product_service::ProductService;
use crate::error::AppError;
use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/inventory", get(inventory_report))
}

/// JSON counterpart of the inventory report: aggregate figures over the
/// whole collection.
async fn inventory_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InventorySummary>, AppError> {
    let product_service = ProductService::new(state.clone());

    let summary = product_service.inventory_summary().await?;

    Ok(Json(summary))
}
