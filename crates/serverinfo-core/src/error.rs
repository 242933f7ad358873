//! Shared error type across serverinfo crates.

use thiserror::Error;

/// Stable error codes (used in logs and API payloads).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad metric declaration or invalid configuration.
    Configuration,
    /// Invalid value passed to a metric operation.
    InvalidArgument,
    /// Unsupported config file version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Configuration => "CONFIGURATION",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ServerInfoError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ServerInfoError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ServerInfoError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerInfoError::Configuration(_) => ErrorCode::Configuration,
            ServerInfoError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            ServerInfoError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            ServerInfoError::Internal(_) => ErrorCode::Internal,
        }
    }
}
