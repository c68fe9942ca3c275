//! Palette generation endpoint.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use tonal_core::palette::generate_palette;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::types::{PaletteQuery, PaletteResponse};

/// Generate a tonal palette around the color in the path.
///
/// The path carries the hex digits without `#`; `?step=` sets the tone
/// distance and falls back to the configured default.
pub async fn gen_palette(
    State(state): State<Arc<AppState>>,
    Path(hex): Path<String>,
    query: Result<Query<PaletteQuery>, QueryRejection>,
) -> AppResult<Json<PaletteResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let step = query.step.unwrap_or(state.config.default_step);

    let palette = generate_palette(&hex, step)?;
    tracing::debug!(
        hex = %palette.main_color().hex(),
        step,
        stops = palette.len(),
        "generated palette"
    );

    Ok(Json(PaletteResponse {
        parsed: palette.base().into(),
        color_palette: palette,
    }))
}
