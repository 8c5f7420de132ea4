pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Headroom over the upload limit for multipart framing; the precise
    // size check happens in the extraction layer.
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + 64 * 1024);

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(handlers::handle_analyze))
        .route(
            "/api/v1/analysis/upload",
            post(handlers::handle_analyze_upload),
        )
        .route(
            "/api/v1/analysis/insights",
            post(handlers::handle_insights),
        )
        .route("/api/v1/taxonomy", get(handlers::handle_taxonomy))
        .layer(body_limit)
        .with_state(state)
}
