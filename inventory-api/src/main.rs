use std::sync::Arc;

use inventory_api::config::Config;
use inventory_api::error::AppError;
use inventory_api::infrastructure::storage::product_store::init_store;
use inventory_api::logging::init_logging;
use inventory_api::server::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config)?;

    tracing::info!("Starting inventory API service");

    let store = init_store(&config).await?;

    let app_state = AppState {
        config: config.clone(),
        store: Arc::new(store),
    };

    let app = create_app(app_state).await?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;
    Ok(())
}
