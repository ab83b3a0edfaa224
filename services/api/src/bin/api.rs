//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{GeminiModelAdapter, HttpDocumentFetcher, PdfTextExtractor},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let fetcher = Arc::new(HttpDocumentFetcher::new(config.fetch_timeout)?);
    let extractor = Arc::new(PdfTextExtractor::new());
    let model = Arc::new(GeminiModelAdapter::from_credentials(
        &config.gemini_api_base,
        &config.gemini_api_key,
        config.gemini_model.clone(),
    ));
    info!(model = %config.gemini_model, "Model client ready.");

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        fetcher,
        extractor,
        model,
    });

    // --- 4. Create the Web Router ---
    let app = build_router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
