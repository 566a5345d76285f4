//! HTTP error response shape
//!
//! The `IntoResponse` implementation for `AppError` lives in the binary crate
//! (zipdrop-api) because of the orphan rule.

use serde::Serialize;
use utoipa::ToSchema;
use zipdrop_core::{AppError, ErrorMetadata};

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    /// Client-safe rendering of an error. Sensitive variants carry no internal detail.
    pub fn from_app_error(err: &AppError) -> Self {
        ErrorResponse {
            error: err.client_message(),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(str::to_string),
            error_type: if err.is_sensitive() {
                None
            } else {
                Some(err.error_type().to_string())
            },
        }
    }
}
