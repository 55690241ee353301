use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::{products, reports};
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::storage::product_store::ProductStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<ProductStore>,
}

pub async fn create_app(state: AppState) -> Result<Router, AppError> {
    let app_state = Arc::new(state);

    let health_route = Router::new().route("/health", get(|| async { "OK" }));

    let api_routes = Router::new()
        .nest("/products", products::routes())
        .nest("/reports", reports::routes());

    let app = Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(app_state);

    Ok(app)
}
