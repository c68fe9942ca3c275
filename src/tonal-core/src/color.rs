//! Color values and color-space conversion.
//!
//! This module provides the [`Color`] value type along with the plain
//! conversion functions it is built on:
//!
//! - [`hex_to_rgb`] / [`rgb_to_hex`]
//! - [`rgb_to_hsl`] / [`hsl_to_rgb`]
//! - [`hex_to_hsl`] / [`hsl_to_hex`]
//! - [`relative_luminance`] and [`contrast_ratio`] (WCAG 2.1)
//!
//! # Color Representation
//!
//! A [`Color`] is an opaque 8-bit sRGB triple. Its canonical textual form is
//! the lowercase `#rrggbb` hex string; RGB and HSL views are derived from the
//! same triple on demand, so the three never disagree.
//!
//! # Supported Formats
//!
//! - Hex strings: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` (the `#` is optional)
//! - Alpha digits are validated and then dropped
//!
//! # Examples
//!
//! ```
//! use tonal_core::color::{Color, Hsl, hsl_to_hex};
//!
//! let blue = Color::parse("#3498DB").unwrap();
//! assert_eq!(blue.hex(), "#3498db");
//! assert_eq!(blue.rgb().b, 219);
//!
//! let red = hsl_to_hex(Hsl::new(0.0, 100.0, 50.0));
//! assert_eq!(red, "#ff0000");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorError;

/// WCAG luminance weight of the red channel.
const LUMA_RED: f64 = 0.2126;
/// WCAG luminance weight of the green channel.
const LUMA_GREEN: f64 = 0.7152;
/// WCAG luminance weight of the blue channel.
const LUMA_BLUE: f64 = 0.0722;

const GAMMA_THRESHOLD: f64 = 0.039_28;
const GAMMA_FACTOR: f64 = 12.92;
const GAMMA_OFFSET: f64 = 0.055;
const GAMMA_DIVISOR: f64 = 1.055;
const GAMMA_EXPONENT: f64 = 2.4;

/// Offset added to both luminances in the WCAG contrast ratio.
const CONTRAST_OFFSET: f64 = 0.05;

// ============================================================================
// RGB
// ============================================================================

/// An 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a new RGB triple.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

// ============================================================================
// HSL
// ============================================================================

/// A color in HSL space.
///
/// - `h`: hue in degrees, `[0, 360)`
/// - `s`: saturation in percent, `[0, 100]`
/// - `l`: lightness in percent, `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in degrees.
    pub h: f64,
    /// Saturation in percent.
    pub s: f64,
    /// Lightness in percent.
    pub l: f64,
}

impl Hsl {
    /// Creates a normalized HSL value.
    ///
    /// The hue wraps into `[0, 360)`; saturation and lightness clamp to
    /// `[0, 100]`.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: wrap_hue(h),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    /// Rounds every component to whole units.
    pub fn round(self) -> RoundedHsl {
        RoundedHsl {
            h: wrap_hue(self.h.round()) as u16,
            s: self.s.round().clamp(0.0, 100.0) as u8,
            l: self.l.round().clamp(0.0, 100.0) as u8,
        }
    }
}

/// HSL rounded to whole degrees and percent, as reported over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RoundedHsl {
    /// Hue in degrees (0-359).
    pub h: u16,
    /// Saturation in percent (0-100).
    pub s: u8,
    /// Lightness in percent (0-100).
    pub l: u8,
}

fn wrap_hue(h: f64) -> f64 {
    let h = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if h >= 360.0 { 0.0 } else { h }
}

// ============================================================================
// Hex parsing and formatting
// ============================================================================

/// Parses a hex color string into an RGB triple.
///
/// Accepts 3, 4, 6 or 8 hex digits, with or without a leading `#`. Shorthand
/// digits are doubled (`#f80` is `#ff8800`); alpha digits are validated and
/// discarded.
///
/// # Examples
///
/// ```
/// use tonal_core::color::{Rgb, hex_to_rgb};
///
/// assert_eq!(hex_to_rgb("#3498db").unwrap(), Rgb::new(52, 152, 219));
/// assert_eq!(hex_to_rgb("F80").unwrap(), Rgb::new(255, 136, 0));
/// assert!(hex_to_rgb("#zzz").is_err());
/// ```
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    if digits.is_empty() {
        return Err(ColorError::EmptyInput);
    }

    let len = digits.len();
    if !matches!(len, 3 | 4 | 6 | 8) {
        return Err(ColorError::InvalidLength(len));
    }

    let nibbles = digits
        .bytes()
        .map(hex_nibble)
        .collect::<Option<Vec<u8>>>()
        .ok_or(ColorError::InvalidHexChar)?;

    let rgb = if len <= 4 {
        Rgb::new(nibbles[0] * 17, nibbles[1] * 17, nibbles[2] * 17)
    } else {
        Rgb::new(
            (nibbles[0] << 4) | nibbles[1],
            (nibbles[2] << 4) | nibbles[3],
            (nibbles[4] << 4) | nibbles[5],
        )
    };

    Ok(rgb)
}

fn hex_nibble(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).map(|d| d as u8)
}

/// Formats an RGB triple as a canonical lowercase `#rrggbb` string.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

// ============================================================================
// HSL conversion
// ============================================================================

/// Converts an RGB triple to HSL.
///
/// The result is not rounded; use [`Hsl::round`] for display.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let h = if max == min {
        0.0
    } else if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    let h = (h * 60.0).min(360.0);
    let h = if h < 0.0 { h + 360.0 } else { h };

    let l = (min + max) / 2.0;

    let s = if max == min {
        0.0
    } else if l <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    Hsl::new(h, s * 100.0, l * 100.0)
}

/// Converts an HSL color to an RGB triple, rounding each channel.
///
/// Out-of-range input is normalized first (see [`Hsl::new`]).
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let Hsl { h, s, l } = Hsl::new(hsl.h, hsl.s, hsl.l);
    let h = h / 360.0;
    let s = s / 100.0;
    let l = l / 100.0;

    if s == 0.0 {
        let v = to_channel(l);
        return Rgb::new(v, v, v);
    }

    let t2 = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let t1 = 2.0 * l - t2;

    Rgb::new(
        to_channel(hue_to_channel(t1, t2, h + 1.0 / 3.0)),
        to_channel(hue_to_channel(t1, t2, h)),
        to_channel(hue_to_channel(t1, t2, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(t1: f64, t2: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if 6.0 * t < 1.0 {
        t1 + (t2 - t1) * 6.0 * t
    } else if 2.0 * t < 1.0 {
        t2
    } else if 3.0 * t < 2.0 {
        t1 + (t2 - t1) * (2.0 / 3.0 - t) * 6.0
    } else {
        t1
    }
}

#[inline]
fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Parses a hex color and converts it to HSL.
pub fn hex_to_hsl(hex: &str) -> Result<Hsl, ColorError> {
    hex_to_rgb(hex).map(rgb_to_hsl)
}

/// Converts an HSL color to a canonical `#rrggbb` string.
pub fn hsl_to_hex(hsl: Hsl) -> String {
    rgb_to_hex(hsl_to_rgb(hsl))
}

// ============================================================================
// Luminance
// ============================================================================

/// Linearizes one sRGB channel for the luminance sum.
fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= GAMMA_THRESHOLD {
        c / GAMMA_FACTOR
    } else {
        ((c + GAMMA_OFFSET) / GAMMA_DIVISOR).powf(GAMMA_EXPONENT)
    }
}

/// Computes the WCAG 2.1 relative luminance of a color.
///
/// Returns a value in `[0.0, 1.0]` where 0 is black and 1 is white.
pub fn relative_luminance(rgb: Rgb) -> f64 {
    LUMA_RED * srgb_to_linear(rgb.r)
        + LUMA_GREEN * srgb_to_linear(rgb.g)
        + LUMA_BLUE * srgb_to_linear(rgb.b)
}

/// Computes the WCAG 2.1 contrast ratio between two relative luminances.
///
/// Returns a value in `[1.0, 21.0]`; argument order does not matter.
pub fn contrast_ratio(lum1: f64, lum2: f64) -> f64 {
    let lighter = lum1.max(lum2);
    let darker = lum1.min(lum2);
    (lighter + CONTRAST_OFFSET) / (darker + CONTRAST_OFFSET)
}

// ============================================================================
// Color
// ============================================================================

/// An opaque sRGB color whose canonical form is a lowercase `#rrggbb` string.
///
/// Serializes to and from that hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    rgb: Rgb,
}

impl Color {
    /// Opaque black (`#000000`).
    pub const BLACK: Self = Self::from_rgb(Rgb::BLACK);

    /// Opaque white (`#ffffff`).
    pub const WHITE: Self = Self::from_rgb(Rgb::WHITE);

    /// Parses a color from a hex string. See [`hex_to_rgb`] for the accepted
    /// formats.
    pub fn parse(hex: &str) -> Result<Self, ColorError> {
        hex_to_rgb(hex).map(Self::from_rgb)
    }

    /// Creates a color from an RGB triple.
    #[inline]
    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self { rgb }
    }

    /// Creates a color from HSL, rounding to the nearest 8-bit channels.
    pub fn from_hsl(hsl: Hsl) -> Self {
        Self::from_rgb(hsl_to_rgb(hsl))
    }

    /// Returns the canonical lowercase `#rrggbb` string.
    pub fn hex(&self) -> String {
        rgb_to_hex(self.rgb)
    }

    /// Returns the RGB channels.
    #[inline]
    pub const fn rgb(&self) -> Rgb {
        self.rgb
    }

    /// Returns the color in HSL space (unrounded).
    pub fn hsl(&self) -> Hsl {
        rgb_to_hsl(self.rgb)
    }

    /// Returns the WCAG relative luminance (0.0 to 1.0).
    pub fn luminance(&self) -> f64 {
        relative_luminance(self.rgb)
    }

    /// Returns the WCAG contrast ratio between this color and another.
    pub fn contrast_with(&self, other: &Self) -> f64 {
        contrast_ratio(self.luminance(), other.luminance())
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb(rgb)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::parse(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    mod hex_tests {
        use super::*;

        #[test]
        fn test_hex_6digit() {
            assert_eq!(hex_to_rgb("#3498db").unwrap(), Rgb::new(52, 152, 219));
        }

        #[test]
        fn test_hex_uppercase() {
            assert_eq!(hex_to_rgb("#FF8000").unwrap(), Rgb::new(255, 128, 0));
        }

        #[test]
        fn test_hex_3digit() {
            assert_eq!(hex_to_rgb("#F80").unwrap(), Rgb::new(255, 136, 0));
        }

        #[test]
        fn test_hex_4digit_drops_alpha() {
            assert_eq!(hex_to_rgb("#F808").unwrap(), Rgb::new(255, 136, 0));
        }

        #[test]
        fn test_hex_8digit_drops_alpha() {
            assert_eq!(hex_to_rgb("#FF800080").unwrap(), Rgb::new(255, 128, 0));
        }

        #[test]
        fn test_hex_no_hash() {
            assert_eq!(hex_to_rgb("3498db").unwrap(), Rgb::new(52, 152, 219));
        }

        #[test]
        fn test_hex_empty() {
            assert_eq!(hex_to_rgb(""), Err(ColorError::EmptyInput));
            assert_eq!(hex_to_rgb("#"), Err(ColorError::EmptyInput));
        }

        #[test]
        fn test_hex_invalid_length() {
            assert_eq!(hex_to_rgb("#12345"), Err(ColorError::InvalidLength(5)));
            assert_eq!(
                hex_to_rgb("not-a-color"),
                Err(ColorError::InvalidLength(11))
            );
        }

        #[test]
        fn test_hex_invalid_char() {
            assert_eq!(hex_to_rgb("#zzz"), Err(ColorError::InvalidHexChar));
            assert_eq!(hex_to_rgb("#GGGGGG"), Err(ColorError::InvalidHexChar));
        }

        #[test]
        fn test_hex_multibyte_rejected() {
            // "é" is two bytes, so this is four bytes long
            assert_eq!(hex_to_rgb("#aéb"), Err(ColorError::InvalidHexChar));
        }

        #[test]
        fn test_rgb_to_hex_is_lowercase() {
            assert_eq!(rgb_to_hex(Rgb::new(52, 152, 219)), "#3498db");
            assert_eq!(rgb_to_hex(Rgb::new(0, 10, 255)), "#000aff");
        }
    }

    mod hsl_tests {
        use super::*;

        #[test]
        fn test_primaries_to_hsl() {
            assert_eq!(rgb_to_hsl(Rgb::new(255, 0, 0)), Hsl::new(0.0, 100.0, 50.0));
            assert_eq!(
                rgb_to_hsl(Rgb::new(0, 255, 0)).round(),
                RoundedHsl { h: 120, s: 100, l: 50 }
            );
            assert_eq!(
                rgb_to_hsl(Rgb::new(0, 0, 255)).round(),
                RoundedHsl { h: 240, s: 100, l: 50 }
            );
        }

        #[test]
        fn test_gray_has_no_hue() {
            let hsl = rgb_to_hsl(Rgb::new(128, 128, 128));
            assert_eq!(hsl.h, 0.0);
            assert_eq!(hsl.s, 0.0);
            assert!(approx_eq(hsl.l, 50.196, 0.001), "lightness: {}", hsl.l);
        }

        #[test]
        fn test_reference_color() {
            let hsl = hex_to_hsl("#3498db").unwrap();
            assert_eq!(hsl.round(), RoundedHsl { h: 204, s: 70, l: 53 });
        }

        #[test]
        fn test_hsl_to_rgb_primaries() {
            assert_eq!(hsl_to_rgb(Hsl::new(0.0, 100.0, 50.0)), Rgb::new(255, 0, 0));
            assert_eq!(hsl_to_rgb(Hsl::new(120.0, 100.0, 25.0)), Rgb::new(0, 128, 0));
            assert_eq!(hsl_to_rgb(Hsl::new(240.0, 100.0, 50.0)), Rgb::new(0, 0, 255));
        }

        #[test]
        fn test_hsl_extremes() {
            assert_eq!(hsl_to_hex(Hsl::new(200.0, 80.0, 100.0)), "#ffffff");
            assert_eq!(hsl_to_hex(Hsl::new(200.0, 80.0, 0.0)), "#000000");
        }

        #[test]
        fn test_hue_wraps() {
            assert_eq!(Hsl::new(370.0, 50.0, 50.0).h, 10.0);
            assert_eq!(Hsl::new(-30.0, 50.0, 50.0).h, 330.0);
            assert_eq!(Hsl::new(360.0, 50.0, 50.0).h, 0.0);
        }

        #[test]
        fn test_saturation_and_lightness_clamp() {
            let hsl = Hsl::new(10.0, 150.0, -5.0);
            assert_eq!(hsl.s, 100.0);
            assert_eq!(hsl.l, 0.0);
        }

        #[test]
        fn test_round_wraps_hue() {
            let hsl = Hsl {
                h: 359.7,
                s: 40.2,
                l: 60.5,
            };
            assert_eq!(hsl.round(), RoundedHsl { h: 0, s: 40, l: 61 });
        }

        #[test]
        fn test_round_trip_within_one_step() {
            for hex in [
                "#3498db", "#e74c3c", "#2ecc71", "#f1c40f", "#8e44ad", "#1abc9c", "#123456",
                "#fedcba", "#010203", "#7f7f7f", "#ff00ff", "#00ffff",
            ] {
                let original = hex_to_rgb(hex).unwrap();
                let back = hsl_to_rgb(rgb_to_hsl(original));
                for (a, b) in [
                    (original.r, back.r),
                    (original.g, back.g),
                    (original.b, back.b),
                ] {
                    assert!(a.abs_diff(b) <= 1, "{hex} drifted to {}", rgb_to_hex(back));
                }
            }
        }
    }

    mod luminance_tests {
        use super::*;

        #[test]
        fn test_luminance_black_is_zero() {
            assert!(approx_eq(relative_luminance(Rgb::BLACK), 0.0, 1e-9));
        }

        #[test]
        fn test_luminance_white_is_one() {
            assert!(approx_eq(relative_luminance(Rgb::WHITE), 1.0, 1e-9));
        }

        #[test]
        fn test_luminance_pure_green() {
            let lum = relative_luminance(Rgb::new(0, 255, 0));
            assert!(approx_eq(lum, 0.7152, 1e-9), "green luminance: {lum}");
        }

        #[test]
        fn test_luminance_linear_segment() {
            // 10/255 is below the gamma threshold
            let lum = relative_luminance(Rgb::new(10, 10, 10));
            assert!(approx_eq(lum, 10.0 / 255.0 / 12.92, 1e-12), "luminance: {lum}");
        }

        #[test]
        fn test_contrast_black_white_is_21() {
            let ratio = contrast_ratio(1.0, 0.0);
            assert!(approx_eq(ratio, 21.0, 1e-9), "ratio: {ratio}");
        }

        #[test]
        fn test_contrast_is_symmetric() {
            assert_eq!(contrast_ratio(0.2, 0.7), contrast_ratio(0.7, 0.2));
        }

        #[test]
        fn test_contrast_same_is_one() {
            assert_eq!(contrast_ratio(0.4, 0.4), 1.0);
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_parse_canonicalizes() {
            let c = Color::parse("#3498DB").unwrap();
            assert_eq!(c.hex(), "#3498db");
            assert_eq!(c.to_string(), "#3498db");
        }

        #[test]
        fn test_shorthand_expands() {
            assert_eq!(Color::parse("fff").unwrap(), Color::WHITE);
        }

        #[test]
        fn test_from_str() {
            let c: Color = "#000".parse().unwrap();
            assert_eq!(c, Color::BLACK);
            assert!("nope".parse::<Color>().is_err());
        }

        #[test]
        fn test_contrast_with() {
            let ratio = Color::BLACK.contrast_with(&Color::WHITE);
            assert!(approx_eq(ratio, 21.0, 1e-9));
        }

        #[test]
        fn test_serde_as_hex_string() {
            let c = Color::parse("#3498db").unwrap();
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, "\"#3498db\"");

            let parsed: Color = serde_json::from_str("\"#3498DB\"").unwrap();
            assert_eq!(parsed, c);

            assert!(serde_json::from_str::<Color>("\"#zz\"").is_err());
        }
    }
}
