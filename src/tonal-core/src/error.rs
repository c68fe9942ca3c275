//! Error types for color parsing and palette generation.

use thiserror::Error;

/// Error type for hex color parsing.
///
/// Every variant is an "invalid color" from the caller's point of view; the
/// variants only refine the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Input string was empty (or only a `#`).
    #[error("invalid hex color: empty input")]
    EmptyInput,

    /// Hex string had an invalid number of digits.
    #[error("invalid hex color: {0} digits (expected 3, 4, 6, or 8)")]
    InvalidLength(usize),

    /// Input contained a character outside `0-9a-fA-F`.
    #[error("invalid hex color: non-hexadecimal character")]
    InvalidHexChar,
}

/// Error type for palette generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    /// The base color could not be parsed.
    #[error(transparent)]
    InvalidColor(#[from] ColorError),

    /// The tone step was zero.
    #[error("invalid step {0}: must be greater than zero")]
    InvalidStep(u16),
}

/// Result type alias for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;
