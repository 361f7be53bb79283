//! Error types module
//!
//! This module provides the error taxonomy used throughout the mediagate
//! application. Every failure surfaced to a client maps onto one `AppError`
//! variant; backend-specific detail stays in logs and never reaches the wire.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client misbehavior worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SIZE_MISMATCH")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Length required: {0}")]
    LengthRequired(String),

    #[error("Payload too large: declared {declared} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { declared: u64, limit: u64 },

    #[error("Size mismatch: declared {declared} bytes but received {actual} bytes")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage backend failure: {0}")]
    BackendFailure(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant for dynamic content.
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
            Some("Check the bearer token and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidRequest(_) => (
            400,
            "INVALID_REQUEST",
            false,
            Some("Check request metadata and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::LengthRequired(_) => (
            411,
            "LENGTH_REQUIRED",
            false,
            Some("Send an explicit Content-Length header"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the file size below the category limit"),
            false,
            LogLevel::Debug,
        ),
        AppError::SizeMismatch { .. } => (
            400,
            "SIZE_MISMATCH",
            false,
            Some("Resend the upload with a matching Content-Length"),
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the object path exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            Some("Contact the operator; the service is misconfigured"),
            true,
            LogLevel::Error,
        ),
        AppError::BackendFailure(_) => (
            500,
            "BACKEND_FAILURE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidRequest(_) => "InvalidRequest",
            AppError::LengthRequired(_) => "LengthRequired",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::SizeMismatch { .. } => "SizeMismatch",
            AppError::NotFound(_) => "NotFound",
            AppError::Configuration(_) => "Configuration",
            AppError::BackendFailure(_) => "BackendFailure",
        }
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
            AppError::InvalidRequest(ref msg) => msg.clone(),
            AppError::LengthRequired(ref msg) => msg.clone(),
            AppError::PayloadTooLarge { declared, limit } => {
                format!(
                    "File of {} bytes exceeds the {} byte limit for this category",
                    declared, limit
                )
            }
            AppError::SizeMismatch { declared, actual } => {
                format!(
                    "Upload declared {} bytes but {} bytes were received; nothing was stored",
                    declared, actual
                )
            }
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Configuration(_) => "Service configuration error".to_string(),
            AppError::BackendFailure(_) => "Failed to access storage".to_string(),
        }
    }
}
