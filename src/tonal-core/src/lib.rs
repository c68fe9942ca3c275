//! Core palette engine for `tonal`.
//!
//! This crate turns a single hex color into a tonal ramp and annotates every
//! swatch with a readable text color:
//!
//! - [`color`]: hex, RGB and HSL conversions plus WCAG relative luminance
//! - [`contrast`]: contrast ratios, text-color policies and WCAG levels
//! - [`palette`]: the tonal ramp built around the input's hue and saturation
//! - [`error`]: error types for the core library
//!
//! Everything here is pure and synchronous. Values are immutable once built,
//! so they can be shared freely across threads.
//!
//! # Examples
//!
//! ## Generating a palette
//!
//! ```
//! use tonal_core::palette::generate_palette;
//!
//! let palette = generate_palette("#3498db", 100).unwrap();
//!
//! // The input color lands on the tone that matches its lightness.
//! assert_eq!(palette.main_color().hex(), "#3498db");
//! assert_eq!(palette.main_index(), 500);
//! assert_eq!(palette.len(), 9);
//! ```
//!
//! ## Picking a text color
//!
//! ```
//! use tonal_core::contrast::{TextColor, optimal_text_color_wcag};
//!
//! assert_eq!(optimal_text_color_wcag("#000000").unwrap(), TextColor::White);
//! assert_eq!(optimal_text_color_wcag("#ffffff").unwrap(), TextColor::Black);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::doc_markdown)]

pub mod color;
pub mod contrast;
pub mod error;
pub mod palette;

pub use color::{Color, Hsl, Rgb};
pub use contrast::{ContrastAnalysis, TextColor, TextColorPolicy, TextLuminance, WcagLevel};
pub use error::{ColorError, PaletteError};
pub use palette::{Palette, PaletteStop, generate_palette};
