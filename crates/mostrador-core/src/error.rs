//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                     │
//! │  ├── CoreError        - Cart / pricing domain errors                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mostrador-cache errors (separate crate)                               │
//! │  └── CacheError       - Local store failures                           │
//! │                                                                         │
//! │  mostrador-api errors (separate crate)                                 │
//! │  └── ApiError         - Backend request failures                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → notification channel  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quotation id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing notifications.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempted to quote or finalize an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// An ERP quotation requires a client on the cart.
    #[error("A client must be selected before quoting")]
    ClientRequired,

    /// Removing the client from a cart bound to a confirmed external
    /// quotation silently starts a new quotation; the operator must
    /// acknowledge this first.
    ///
    /// ## When This Occurs
    /// - Cart is bound to an ERP quotation (`quotation_kind == Erp`)
    /// - The bound quotation id is still set
    /// - The caller used `remove_client()` instead of
    ///   `remove_client_confirmed()`
    #[error("Quotation {quotation_id} is bound to this cart; removing the client starts a new quotation")]
    ClientRemovalNeedsConfirmation { quotation_id: String },

    /// A monetary string could not be parsed under the configured locale.
    #[error("Cannot parse money value '{0}'")]
    MoneyParse(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed money string, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ClientRemovalNeedsConfirmation {
            quotation_id: "Q-000123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Quotation Q-000123 is bound to this cart; removing the client starts a new quotation"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "store".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
