//! # Session Error Types
//!
//! Error types for the session engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Storage       │  │     Business            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Cache(..)      │  │  Core(..)               │ │
//! │  │  ConfigLoad     │  │  Api(..)        │  │  (empty cart, client    │ │
//! │  │                 │  │                 │  │   guard, validation)    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence failures mostly do NOT travel as errors: the bridge
//! converts them into notifications and keeps the in-memory cart
//! authoritative. The variants here are for operations the caller must
//! react to (quoting preconditions, configuration problems).

use thiserror::Error;

/// Result type alias for session operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Session engine errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid session configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Domain rule violation (empty cart, client guard, validation).
    #[error(transparent)]
    Core(#[from] mostrador_core::CoreError),

    /// Local cache failure that the caller asked to see explicitly.
    #[error(transparent)]
    Cache(#[from] mostrador_cache::CacheError),

    /// Backend failure that the caller asked to see explicitly.
    #[error(transparent)]
    Api(#[from] mostrador_api::ApiError),

    /// A background channel closed unexpectedly.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl SyncError {
    /// Whether this error should send the operator to the login flow.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SyncError::Api(api) if api.is_auth_failure())
    }
}
