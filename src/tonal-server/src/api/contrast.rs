//! Contrast analysis endpoints.

use axum::{
    Json,
    extract::{Path, Query, rejection::QueryRejection},
};
use tonal_core::Color;
use tonal_core::contrast::{
    ConformanceLevel, TextColorPolicy, analyze_contrast, round_to_hundredths,
};

use crate::error::{AppError, AppResult};

use super::types::{CombinationQuery, CombinationResponse, ContrastResponse};

/// Best text color for a background, with its WCAG rating.
pub async fn analyze(Path(hex): Path<String>) -> AppResult<Json<ContrastResponse>> {
    let background = Color::parse(&hex)?;
    let analysis = analyze_contrast(&background.hex())?;

    Ok(Json(ContrastResponse {
        background: background.hex(),
        text_color_fast: TextColorPolicy::LuminanceThreshold.pick(background.rgb()),
        analysis,
    }))
}

/// Contrast ratio of a foreground on a background, checked against a level.
pub async fn combination(
    Path((background, foreground)): Path<(String, String)>,
    query: Result<Query<CombinationQuery>, QueryRejection>,
) -> AppResult<Json<CombinationResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let level = match query.level {
        Some(level) => level
            .parse::<ConformanceLevel>()
            .map_err(AppError::BadRequest)?,
        None => ConformanceLevel::default(),
    };

    let bg = Color::parse(&background)?;
    let fg = Color::parse(&foreground)?;
    let ratio = bg.contrast_with(&fg);

    Ok(Json(CombinationResponse {
        background: bg.hex(),
        foreground: fg.hex(),
        level,
        contrast_ratio: round_to_hundredths(ratio),
        accessible: ratio >= level.min_ratio(),
    }))
}
