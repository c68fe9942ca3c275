//! REST API routes and handlers.

mod contrast;
mod health;
mod palette;
pub mod types;

use std::sync::Arc;

use axum::{Router, http::Uri, routing::get};

use crate::error::AppError;
use crate::state::AppState;

pub use types::{CombinationResponse, ContrastResponse, HealthResponse, PaletteResponse};

/// Create the API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gen-palette/{hex}", get(palette::gen_palette))
        .route("/api/health", get(health::health_check))
        .route("/api/contrast/{hex}", get(contrast::analyze))
        .route(
            "/api/contrast/{background}/{foreground}",
            get(contrast::combination),
        )
        .fallback(not_found)
}

/// Fallback for unknown routes.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

