//! Error types for the palette server.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tonal_core::{ColorError, PaletteError};

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// The color in the path could not be parsed.
    #[error("{0}")]
    InvalidColor(ColorError),

    /// The palette step was rejected.
    #[error("invalid step {0}: must be greater than zero")]
    InvalidStep(u16),

    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded {
        /// Seconds until the client's window resets.
        retry_after_secs: u64,
    },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidColor(_) | Self::InvalidStep(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidColor(_) => "invalid_color",
            Self::InvalidStep(_) => "invalid_step",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::Timeout => "timeout",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{self}");
        }

        let retry_after = match &self {
            Self::RateLimitExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

/// Result type for the palette server.
pub type AppResult<T> = Result<T, AppError>;

impl From<ColorError> for AppError {
    fn from(error: ColorError) -> Self {
        Self::InvalidColor(error)
    }
}

impl From<PaletteError> for AppError {
    fn from(error: PaletteError) -> Self {
        match error {
            PaletteError::InvalidColor(e) => Self::InvalidColor(e),
            PaletteError::InvalidStep(step) => Self::InvalidStep(step),
        }
    }
}
