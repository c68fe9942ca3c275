//! Tonal palette generation.
//!
//! A palette is a lightness ramp that keeps the hue and saturation of a base
//! color. Tones are keyed by an index in `(0, 1000)`: the higher the index, the
//! darker the tone (`lightness = 100 - index / 10`).
//!
//! ```text
//! hex ──► Color ──► base HSL ──► main index (lightness bucket)
//!                       │
//!                       ▼
//!         for index in step, 2·step, … < 1000
//!              index == main ? input color : hsl(h, s, 100 - index/10)
//!                       │
//!                       ▼
//!         PaletteStop { color, text annotations }
//! ```
//!
//! The input color itself is placed on the tone whose bucket matches its
//! lightness. That stop reuses the parsed input verbatim instead of going
//! through HSL again, so the caller always gets their exact color back.

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::color::{Color, Hsl};
use crate::contrast::{TextColor, TextColorPolicy, TextLuminance, text_luminance};
use crate::error::{PaletteError, Result};

/// Upper bound (exclusive) of the tone index scale.
pub const TONE_SCALE: u16 = 1000;

/// Step used when the caller does not provide one.
pub const DEFAULT_STEP: u16 = 100;

/// Returns the tone index that the given lightness (0-100) maps to.
///
/// Lightness is truncated to its 10-unit bucket before scaling, so every
/// lightness in `[50, 60)` maps to 500. Pure white maps to 0 and pure black to
/// 1000, both outside the regular ramp.
pub fn main_index(lightness: f64) -> u16 {
    let bucket = (lightness.clamp(0.0, 100.0) / 10.0).trunc() as u16;
    TONE_SCALE - bucket * 100
}

/// Lightness of a regular (non-main) tone.
fn tone_lightness(index: u16) -> f64 {
    100.0 - f64::from(index) / 10.0
}

// ============================================================================
// Stops
// ============================================================================

/// One swatch of a palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteStop {
    index: u16,
    color: Color,
    text_luminance: TextLuminance,
    text_color: TextColor,
    text_color_wcag: TextColor,
}

impl PaletteStop {
    /// Builds a stop and computes its text-color annotations.
    pub fn new(index: u16, color: Color) -> Self {
        let rgb = color.rgb();
        Self {
            index,
            color,
            text_luminance: text_luminance(rgb),
            text_color: TextColorPolicy::LuminanceThreshold.pick(rgb),
            text_color_wcag: TextColorPolicy::Wcag.pick(rgb),
        }
    }

    /// Tone index of this stop.
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Color of this stop.
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Canonical hex of this stop.
    pub fn hex(&self) -> String {
        self.color.hex()
    }

    /// Light/dark label from the 0.179 luminance threshold.
    pub const fn text_luminance(&self) -> TextLuminance {
        self.text_luminance
    }

    /// Text color from the fast 0.5 luminance heuristic.
    pub const fn text_color(&self) -> TextColor {
        self.text_color
    }

    /// Text color with the best WCAG contrast ratio.
    pub const fn text_color_wcag(&self) -> TextColor {
        self.text_color_wcag
    }

    /// Text color chosen by the given policy.
    pub const fn text_color_for(&self, policy: TextColorPolicy) -> TextColor {
        match policy {
            TextColorPolicy::Wcag => self.text_color_wcag,
            TextColorPolicy::LuminanceThreshold => self.text_color,
        }
    }
}

impl Serialize for PaletteStop {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PaletteStop", 7)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("hex", &self.color)?;
        state.serialize_field("rgb", &self.color.rgb())?;
        state.serialize_field("hsl", &self.color.hsl().round())?;
        state.serialize_field("textLuminance", &self.text_luminance)?;
        state.serialize_field("textColor", &self.text_color)?;
        state.serialize_field("textColorWCAG", &self.text_color_wcag)?;
        state.end()
    }
}

// ============================================================================
// Palette
// ============================================================================

/// A tonal ramp plus the stop that reproduces the input color.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    #[serde(skip)]
    base: Hsl,
    #[serde(rename = "colors")]
    stops: BTreeMap<u16, PaletteStop>,
    main_color: PaletteStop,
}

impl Palette {
    /// HSL of the input color (unrounded).
    pub const fn base(&self) -> Hsl {
        self.base
    }

    /// The stop holding the input color.
    pub const fn main_color(&self) -> &PaletteStop {
        &self.main_color
    }

    /// Tone index of the input color.
    pub const fn main_index(&self) -> u16 {
        self.main_color.index
    }

    /// Looks up a stop by tone index.
    pub fn get(&self, index: u16) -> Option<&PaletteStop> {
        self.stops.get(&index)
    }

    /// Iterates stops from lightest (lowest index) to darkest.
    pub fn stops(&self) -> impl Iterator<Item = &PaletteStop> {
        self.stops.values()
    }

    /// Number of stops, the main stop included.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false; a palette holds at least its main stop.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Generates a tonal palette around `hex`.
///
/// Regular tones sit at `step, 2·step, …` below 1000 and share the input's
/// hue and saturation. The input color is placed at [`main_index`] of its
/// lightness, even when that index is off the step grid.
///
/// # Errors
///
/// Returns [`PaletteError::InvalidColor`] for a malformed hex string and
/// [`PaletteError::InvalidStep`] when `step` is zero.
///
/// # Examples
///
/// ```
/// use tonal_core::palette::generate_palette;
///
/// let palette = generate_palette("#3498db", 100).unwrap();
/// let indices: Vec<u16> = palette.stops().map(|s| s.index()).collect();
/// assert_eq!(indices, vec![100, 200, 300, 400, 500, 600, 700, 800, 900]);
/// assert_eq!(palette.get(500).unwrap().hex(), "#3498db");
/// ```
pub fn generate_palette(hex: &str, step: u16) -> Result<Palette> {
    let input = Color::parse(hex)?;
    if step == 0 {
        return Err(PaletteError::InvalidStep(step));
    }

    let base = input.hsl();
    let main_color = PaletteStop::new(main_index(base.l), input);

    let mut stops: BTreeMap<u16, PaletteStop> = (step..TONE_SCALE)
        .step_by(usize::from(step))
        .map(|index| {
            let stop = if index == main_color.index {
                main_color.clone()
            } else {
                let tone = Color::from_hsl(Hsl::new(base.h, base.s, tone_lightness(index)));
                PaletteStop::new(index, tone)
            };
            (index, stop)
        })
        .collect();

    stops
        .entry(main_color.index)
        .or_insert_with(|| main_color.clone());

    Ok(Palette {
        base,
        stops,
        main_color,
    })
}
