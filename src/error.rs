//! Error types for inbox triage.

use std::time::Duration;

use axum::http::StatusCode;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text extraction errors for uploaded artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Formato não suportado. Use .txt ou .pdf")]
    UnsupportedFormat { file_name: String },

    #[error("File {file_name} is not valid UTF-8: {reason}")]
    InvalidUtf8 { file_name: String, reason: String },

    #[error("Failed to extract PDF text from {file_name}: {reason}")]
    Pdf { file_name: String, reason: String },
}

/// Outbound inference call failures.
///
/// These never escape the pipeline: every variant is absorbed by the
/// adapter that produced it and resolved through a local fallback.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Endpoint {endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed payload from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("Unrecognized label '{label}'")]
    Unrecognized { label: String },
}

impl RemoteError {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Malformed { .. } => "malformed",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }
}

/// Errors that escape the classification pipeline to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Internal(String),
}

impl PipelineError {
    /// HTTP status the serving layer reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat { .. } => Self::UnsupportedFormat(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
