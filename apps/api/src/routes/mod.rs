pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::convert::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_implemented() -> Result<(), AppError> {
    Err(AppError::NotImplemented)
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // PDF tool API
        .route("/api/v1/pdf/presets", get(handlers::handle_presets))
        .route("/api/v1/pdf/plan", post(handlers::handle_plan))
        .route("/api/v1/pdf/convert", post(handlers::handle_convert))
        // Reserved: merging already-generated PDFs
        .route("/api/v1/pdf/merge", post(not_implemented))
        .layer(body_limit)
        .with_state(state)
}
