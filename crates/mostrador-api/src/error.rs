//! # API Error Types
//!
//! Error types for backend requests, mapped to messages an operator can
//! act on. Authentication expiry is its own variant because the UI
//! reacts to it differently (redirect to login after a short delay,
//! instead of a dismissible warning).

use reqwest::StatusCode;
use thiserror::Error;

/// Backend request errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL is not usable.
    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),

    /// Could not reach the backend at all.
    #[error("Cannot reach the backend at {url}")]
    Unreachable { url: String },

    /// The request timed out.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The session is not authenticated (or expired mid-session).
    /// The UI redirects to the login flow when it sees this.
    #[error("Session is not authenticated")]
    Unauthenticated,

    /// The backend answered with an error payload (`{"error": "..."}`).
    #[error("{0}")]
    Backend(String),

    /// Unexpected HTTP status with no error payload.
    #[error("Unexpected response from backend (HTTP {status})")]
    UnexpectedStatus { status: u16 },

    /// The response body did not match the expected shape.
    #[error("Malformed response from backend: {0}")]
    Decode(String),

    /// Any other transport error.
    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Maps a transport-level reqwest error to a friendly variant.
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            return ApiError::Unreachable { url: url.to_string() };
        }
        if err.is_timeout() {
            return ApiError::Timeout { url: url.to_string() };
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        ApiError::Network(err.to_string())
    }

    /// Maps an unexpected HTTP status (no parseable error payload).
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthenticated,
            other => ApiError::UnexpectedStatus { status: other.as_u16() },
        }
    }

    /// Whether this error should trigger the login redirect.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

/// Result type for backend operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
