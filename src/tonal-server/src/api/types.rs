//! API request and response types.

use serde::{Deserialize, Serialize};
use tonal_core::contrast::{ConformanceLevel, ContrastAnalysis, TextColor};
use tonal_core::{Hsl, Palette};

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================================================
// Palettes
// ============================================================================

/// Query parameters for palette generation.
#[derive(Debug, Deserialize)]
pub struct PaletteQuery {
    /// Distance between tones; the configured default when absent.
    #[serde(default)]
    pub step: Option<u16>,
}

/// HSL of the requested color, rounded to integers.
#[derive(Debug, Serialize)]
pub struct ParsedColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl From<Hsl> for ParsedColor {
    fn from(hsl: Hsl) -> Self {
        let rounded = hsl.round();
        Self {
            hue: rounded.h,
            saturation: rounded.s,
            lightness: rounded.l,
        }
    }
}

/// Palette generation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteResponse {
    pub parsed: ParsedColor,
    pub color_palette: Palette,
}

// ============================================================================
// Contrast
// ============================================================================

/// Text-color analysis of a single background.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastResponse {
    pub background: String,
    /// Pick from the fast luminance heuristic, next to the WCAG pick.
    pub text_color_fast: TextColor,
    #[serde(flatten)]
    pub analysis: ContrastAnalysis,
}

/// Query parameters for a foreground/background check.
#[derive(Debug, Deserialize)]
pub struct CombinationQuery {
    /// Conformance target, `AA` when absent.
    #[serde(default)]
    pub level: Option<String>,
}

/// Result of a foreground/background check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationResponse {
    pub background: String,
    pub foreground: String,
    pub level: ConformanceLevel,
    pub contrast_ratio: f64,
    pub accessible: bool,
}
