//! services/api/src/web/router.rs
//!
//! Assembles the Axum router: routes, middleware layers and the Swagger UI.

use crate::web::{
    middleware::request_id,
    rest::{chat_handler, health_handler, process_handler, ApiDoc},
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router around `app_state`.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin(&app_state.config.cors_origin))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let api_router = Router::new()
        .route("/", get(health_handler))
        .route("/process", post(process_handler))
        .route("/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(app_state.config.max_body_bytes))
        .layer(axum_middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

fn cors_origin(configured: &str) -> AllowOrigin {
    match configured.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!(origin = configured, "Ignoring invalid CORS_ORIGIN; allowing any origin.");
            AllowOrigin::any()
        }
    }
}
