//! # Cache Error Types
//!
//! Error types for the local durable tier.
//!
//! Cache errors are the least severe failure class in the system: the
//! persistence bridge logs them and keeps going with memory-only state,
//! so every variant here ends up as a log line, not a dialog.

use thiserror::Error;

/// Local cache operation errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache database could not be opened or created.
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Cache migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Cache query failed: {0}")]
    QueryFailed(String),

    /// A stored payload no longer deserializes (schema drift, manual
    /// edits, disk corruption). The caller treats this as "no cached
    /// cart" rather than failing the session.
    #[error("Corrupted cache payload: {0}")]
    Corrupted(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => CacheError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::PoolTimedOut => {
                CacheError::ConnectionFailed("Pool timed out".to_string())
            }
            other => CacheError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for CacheError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        CacheError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Corrupted(err.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
