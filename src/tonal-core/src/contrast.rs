//! Text-color selection and WCAG contrast analysis.
//!
//! Two policies decide whether text on a background should be white or black:
//!
//! - [`TextColorPolicy::Wcag`] compares the actual contrast ratios against
//!   white and black and keeps the higher one. This is the default.
//! - [`TextColorPolicy::LuminanceThreshold`] is a cheaper heuristic that
//!   switches at a relative luminance of 0.5.
//!
//! Separately, [`text_luminance`] labels a background `light` or `dark` using
//! the W3C 0.179 luminance cut-off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{Color, Rgb, contrast_ratio, relative_luminance};
use crate::error::ColorError;

/// Luminance above which a background is labelled [`TextLuminance::Dark`].
pub const TEXT_LUMINANCE_THRESHOLD: f64 = 0.179;

/// Luminance below which the fast heuristic picks white text.
pub const FAST_LUMINANCE_THRESHOLD: f64 = 0.5;

/// Minimum contrast ratio for WCAG AA (normal text).
pub const WCAG_AA_RATIO: f64 = 4.5;

/// Minimum contrast ratio for WCAG AAA (normal text).
pub const WCAG_AAA_RATIO: f64 = 7.0;

const WHITE_LUMINANCE: f64 = 1.0;
const BLACK_LUMINANCE: f64 = 0.0;

// ============================================================================
// Text colors
// ============================================================================

/// Light/dark label for the text that should sit on a background.
///
/// `Dark` means the background is bright enough for dark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLuminance {
    /// Use light text.
    Light,
    /// Use dark text.
    Dark,
}

/// A text color recommendation: pure white or pure black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextColor {
    /// `#ffffff`.
    #[serde(rename = "#ffffff")]
    White,
    /// `#000000`.
    #[serde(rename = "#000000")]
    Black,
}

impl TextColor {
    /// Returns the hex string for this text color.
    pub const fn as_hex(self) -> &'static str {
        match self {
            Self::White => "#ffffff",
            Self::Black => "#000000",
        }
    }

    /// Returns the text color as a [`Color`].
    pub const fn color(self) -> Color {
        match self {
            Self::White => Color::WHITE,
            Self::Black => Color::BLACK,
        }
    }

    /// Returns the other choice.
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_hex())
    }
}

/// Strategy for choosing between white and black text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColorPolicy {
    /// Pick whichever of white/black has the higher WCAG contrast ratio.
    /// Ties go to black.
    #[default]
    Wcag,
    /// White when relative luminance is below 0.5, black otherwise.
    LuminanceThreshold,
}

impl TextColorPolicy {
    /// Picks a text color for the given background.
    pub fn pick(self, background: Rgb) -> TextColor {
        let luminance = relative_luminance(background);
        match self {
            Self::Wcag => {
                let with_white = contrast_ratio(luminance, WHITE_LUMINANCE);
                let with_black = contrast_ratio(luminance, BLACK_LUMINANCE);
                if with_white > with_black {
                    TextColor::White
                } else {
                    TextColor::Black
                }
            }
            Self::LuminanceThreshold => {
                if luminance < FAST_LUMINANCE_THRESHOLD {
                    TextColor::White
                } else {
                    TextColor::Black
                }
            }
        }
    }
}

/// Labels a background light or dark at the 0.179 luminance threshold.
pub fn text_luminance(background: Rgb) -> TextLuminance {
    if relative_luminance(background) > TEXT_LUMINANCE_THRESHOLD {
        TextLuminance::Dark
    } else {
        TextLuminance::Light
    }
}

/// Returns the text color with the best WCAG contrast on `background`.
///
/// # Examples
///
/// ```
/// use tonal_core::contrast::{TextColor, optimal_text_color_wcag};
///
/// assert_eq!(optimal_text_color_wcag("#3498db").unwrap(), TextColor::Black);
/// assert_eq!(optimal_text_color_wcag("1a1a2e").unwrap(), TextColor::White);
/// ```
pub fn optimal_text_color_wcag(background: &str) -> Result<TextColor, ColorError> {
    let bg = Color::parse(background)?;
    Ok(TextColorPolicy::Wcag.pick(bg.rgb()))
}

/// Returns the text color chosen by the fast luminance heuristic.
pub fn optimal_text_color(background: &str) -> Result<TextColor, ColorError> {
    let bg = Color::parse(background)?;
    Ok(TextColorPolicy::LuminanceThreshold.pick(bg.rgb()))
}

// ============================================================================
// WCAG levels
// ============================================================================

/// WCAG compliance achieved by a contrast ratio (normal-size text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Ratio of at least 7:1.
    #[serde(rename = "AAA")]
    Aaa,
    /// Ratio of at least 4.5:1.
    #[serde(rename = "AA")]
    Aa,
    /// Below 4.5:1.
    #[serde(rename = "FAIL")]
    Fail,
}

impl WcagLevel {
    /// Classifies a contrast ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= WCAG_AAA_RATIO {
            Self::Aaa
        } else if ratio >= WCAG_AA_RATIO {
            Self::Aa
        } else {
            Self::Fail
        }
    }
}

/// Target level for an accessibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConformanceLevel {
    /// WCAG AA (4.5:1).
    #[default]
    #[serde(rename = "AA")]
    Aa,
    /// WCAG AAA (7:1).
    #[serde(rename = "AAA")]
    Aaa,
}

impl ConformanceLevel {
    /// Minimum contrast ratio required by this level.
    pub const fn min_ratio(self) -> f64 {
        match self {
            Self::Aa => WCAG_AA_RATIO,
            Self::Aaa => WCAG_AAA_RATIO,
        }
    }
}

impl FromStr for ConformanceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AA" => Ok(Self::Aa),
            "AAA" => Ok(Self::Aaa),
            other => Err(format!("unknown WCAG level: {other} (expected AA or AAA)")),
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Contrast report for a background color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastAnalysis {
    /// Text color with the highest contrast.
    pub text_color: TextColor,
    /// Contrast ratio of that text color, rounded to two decimals.
    pub contrast_ratio: f64,
    /// Whether the ratio meets WCAG AA.
    pub is_accessible: bool,
    /// Highest WCAG level met.
    pub wcag_level: WcagLevel,
}

/// Analyzes which text color reads best on `background` and how well.
pub fn analyze_contrast(background: &str) -> Result<ContrastAnalysis, ColorError> {
    let bg = Color::parse(background)?;
    let text_color = TextColorPolicy::Wcag.pick(bg.rgb());
    let ratio = bg.contrast_with(&text_color.color());

    Ok(ContrastAnalysis {
        text_color,
        contrast_ratio: round_to_hundredths(ratio),
        is_accessible: ratio >= WCAG_AA_RATIO,
        wcag_level: WcagLevel::from_ratio(ratio),
    })
}

/// Returns the contrast ratio between two hex colors.
pub fn contrast_between(background: &str, foreground: &str) -> Result<f64, ColorError> {
    let bg = Color::parse(background)?;
    let fg = Color::parse(foreground)?;
    Ok(bg.contrast_with(&fg))
}

/// Checks whether `foreground` on `background` meets the given level.
pub fn is_accessible_combination(
    background: &str,
    foreground: &str,
    level: ConformanceLevel,
) -> Result<bool, ColorError> {
    Ok(contrast_between(background, foreground)? >= level.min_ratio())
}

/// Rounds a ratio to two decimal places for reporting.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    mod policy_tests {
        use super::*;

        #[test]
        fn test_wcag_black_gets_white() {
            assert_eq!(optimal_text_color_wcag("#000000").unwrap(), TextColor::White);
        }

        #[test]
        fn test_wcag_white_gets_black() {
            assert_eq!(optimal_text_color_wcag("#ffffff").unwrap(), TextColor::Black);
        }

        #[test]
        fn test_policies_disagree_in_the_midtones() {
            // Luminance ~0.22: WCAG prefers black, the 0.5 heuristic says white.
            let bg = Rgb::new(0x80, 0x80, 0x80);
            assert_eq!(TextColorPolicy::Wcag.pick(bg), TextColor::Black);
            assert_eq!(TextColorPolicy::LuminanceThreshold.pick(bg), TextColor::White);
        }

        #[test]
        fn test_wcag_pick_never_loses() {
            for hex in ["#3498db", "#777777", "#ff0000", "#00ff00", "#0000ff", "#767676"] {
                let bg = Color::parse(hex).unwrap();
                let chosen = TextColorPolicy::Wcag.pick(bg.rgb());
                let best = bg.contrast_with(&chosen.color());
                let other = bg.contrast_with(&chosen.opposite().color());
                assert!(best >= other, "{hex}: {chosen} {best} < {other}");
            }
        }

        #[test]
        fn test_default_policy_is_wcag() {
            assert_eq!(TextColorPolicy::default(), TextColorPolicy::Wcag);
        }

        #[test]
        fn test_fast_heuristic() {
            assert_eq!(optimal_text_color("#000").unwrap(), TextColor::White);
            assert_eq!(optimal_text_color("#fff").unwrap(), TextColor::Black);
        }

        #[test]
        fn test_invalid_background() {
            assert!(optimal_text_color_wcag("#zzz").is_err());
            assert!(optimal_text_color("").is_err());
        }
    }

    mod luminance_label_tests {
        use super::*;

        #[test]
        fn test_threshold() {
            assert_eq!(text_luminance(Rgb::BLACK), TextLuminance::Light);
            assert_eq!(text_luminance(Rgb::WHITE), TextLuminance::Dark);
            // #3498db has luminance ~0.28
            assert_eq!(text_luminance(Rgb::new(52, 152, 219)), TextLuminance::Dark);
            // #2c3e50 has luminance ~0.04
            assert_eq!(text_luminance(Rgb::new(44, 62, 80)), TextLuminance::Light);
        }
    }

    mod analysis_tests {
        use super::*;

        #[test]
        fn test_analyze_black() {
            let analysis = analyze_contrast("#000000").unwrap();
            assert_eq!(analysis.text_color, TextColor::White);
            assert_eq!(analysis.contrast_ratio, 21.0);
            assert!(analysis.is_accessible);
            assert_eq!(analysis.wcag_level, WcagLevel::Aaa);
        }

        #[test]
        fn test_analyze_midtone_is_rounded() {
            let analysis = analyze_contrast("#3498db").unwrap();
            assert_eq!(analysis.text_color, TextColor::Black);
            assert_eq!(
                analysis.contrast_ratio,
                round_to_hundredths(analysis.contrast_ratio)
            );
            assert!(analysis.contrast_ratio > 6.0 && analysis.contrast_ratio < 7.0);
            assert_eq!(analysis.wcag_level, WcagLevel::Aa);
        }

        #[test]
        fn test_levels() {
            assert_eq!(WcagLevel::from_ratio(21.0), WcagLevel::Aaa);
            assert_eq!(WcagLevel::from_ratio(7.0), WcagLevel::Aaa);
            assert_eq!(WcagLevel::from_ratio(4.5), WcagLevel::Aa);
            assert_eq!(WcagLevel::from_ratio(4.49), WcagLevel::Fail);
        }

        #[test]
        fn test_combination() {
            assert!(is_accessible_combination("#ffffff", "#000000", ConformanceLevel::Aaa).unwrap());
            // #777777 on white is ~4.48:1
            assert!(!is_accessible_combination("#ffffff", "#777777", ConformanceLevel::Aa).unwrap());
            assert!(is_accessible_combination("#ffffff", "#767676", ConformanceLevel::Aa).unwrap());
            assert!(is_accessible_combination("#ffffff", "nope", ConformanceLevel::Aa).is_err());
        }

        #[test]
        fn test_level_from_str() {
            assert_eq!("aa".parse::<ConformanceLevel>(), Ok(ConformanceLevel::Aa));
            assert_eq!("AAA".parse::<ConformanceLevel>(), Ok(ConformanceLevel::Aaa));
            assert!("A".parse::<ConformanceLevel>().is_err());
        }

        #[test]
        fn test_serialized_shape() {
            let json = serde_json::to_value(analyze_contrast("#ffffff").unwrap()).unwrap();
            assert_eq!(json["textColor"], "#000000");
            assert_eq!(json["wcagLevel"], "AAA");
            assert_eq!(json["isAccessible"], true);
        }
    }
}
