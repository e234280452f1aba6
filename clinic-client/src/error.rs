//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business error reported by the API (`error` / `success: false`)
    #[error("Server error: {0}")]
    Server(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local storage I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected before reaching the network
    #[error("{0}")]
    Domain(#[from] AppError),
}

impl ClientError {
    /// Network or parse failure, as opposed to an error the server reported
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::InvalidResponse(_) | Self::Serialization(_)
        )
    }

    /// Domain error code, when the failure came from local validation
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Domain(e) => Some(e.code),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
