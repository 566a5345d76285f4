//! Error types module
//!
//! All failures that cross the core boundary are unified under [`AppError`]. The
//! variants form a closed taxonomy: callers match on [`ErrorKind`] to decide whether
//! to reject an action outright or ask the user to try again.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like quota exhaustion
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "RATE_LIMITED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Copyable discriminant of [`AppError`], used in reports and serialized responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ErrorKind {
    Unauthorized,
    RateLimited,
    NotFound,
    ValidationError,
    PartialFailure,
    UpstreamUnavailable,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::PartialFailure => "PartialFailure",
            ErrorKind::UpstreamUnavailable => "UpstreamUnavailable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded for scope '{scope}', retry in {retry_after_secs}s")]
    RateLimited {
        scope: String,
        retry_after_secs: u64,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{operation} partially completed (done: {}): {reason}", completed.join(", "))]
    PartialFailure {
        operation: String,
        completed: Vec<String>,
        reason: String,
    },

    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },
}

impl AppError {
    /// Shorthand for an upstream collaborator failure.
    pub fn upstream(service: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a step failure of a multi-step operation, recording the steps that did finish.
    pub fn partial(operation: impl Into<String>, completed: &[&str], cause: &AppError) -> Self {
        AppError::PartialFailure {
            operation: operation.into(),
            completed: completed.iter().map(|s| s.to_string()).collect(),
            reason: cause.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::RateLimited { .. } => ErrorKind::RateLimited,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::ValidationError,
            AppError::PartialFailure { .. } => ErrorKind::PartialFailure,
            AppError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::NotFound(_) => "NotFound",
            AppError::Validation(_) => "Validation",
            AppError::PartialFailure { .. } => "PartialFailure",
            AppError::UpstreamUnavailable { .. } => "UpstreamUnavailable",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Sign in with an account that has the required role"),
            false,
            LogLevel::Debug,
        ),
        AppError::RateLimited { .. } => (
            429,
            "RATE_LIMITED",
            true,
            Some("Wait for the Retry-After period and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the media key or ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PartialFailure { .. } => (
            503,
            "PARTIAL_FAILURE",
            true,
            Some("Retry the same request"),
            true,
            LogLevel::Error,
        ),
        AppError::UpstreamUnavailable { .. } => (
            503,
            "UPSTREAM_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::RateLimited { .. } => "Too many requests. Please slow down.".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Validation(ref msg) => msg.clone(),
            AppError::PartialFailure { .. } | AppError::UpstreamUnavailable { .. } => {
                "The service is temporarily unavailable, please try again".to_string()
            }
        }
    }
}
