//! # Validation Module
//!
//! Input validation utilities shared by the UI command layer and the
//! API boundary. Validators reject before any mutation happens, so a
//! failed operation leaves no partial state behind.

use crate::error::ValidationError;
use crate::{MAX_OBSERVATION_LEN, MIN_CLIENT_QUERY_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a client search query.
///
/// ## Rules
/// - Trimmed
/// - At least [`MIN_CLIENT_QUERY_LEN`] characters (the directory search
///   refuses shorter queries)
///
/// ## Returns
/// The trimmed query string.
pub fn validate_client_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() < MIN_CLIENT_QUERY_LEN {
        return Err(ValidationError::TooShort {
            field: "query".to_string(),
            min: MIN_CLIENT_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a store identifier ("BA001GC").
///
/// ## Rules
/// - Must not be empty
/// - Alphanumeric only
pub fn validate_store_id(store: &str) -> ValidationResult<()> {
    let store = store.trim();

    if store.is_empty() {
        return Err(ValidationError::Required {
            field: "store".to_string(),
        });
    }

    if !store.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "store".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax identifier (DNI/CUIT digits, separators allowed).
///
/// ## Rules
/// - 6 to 11 digits once hyphens/dots/spaces are stripped
///
/// ## Returns
/// The digits-only form.
pub fn validate_tax_id(tax_id: &str) -> ValidationResult<String> {
    let digits: String = tax_id.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 6 || digits.len() > 11 {
        return Err(ValidationError::InvalidFormat {
            field: "tax_id".to_string(),
            reason: "must contain 6 to 11 digits".to_string(),
        });
    }

    Ok(digits)
}

/// Validates observation text length (content is handled by the
/// sanitizer in the cart module).
pub fn validate_observations(text: &str) -> ValidationResult<()> {
    if text.chars().count() > MAX_OBSERVATION_LEN {
        return Err(ValidationError::TooLong {
            field: "observations".to_string(),
            max: MAX_OBSERVATION_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_client_query() {
        assert_eq!(validate_client_query("  García  ").unwrap(), "García");
        assert!(validate_client_query("ab").is_err());
        assert!(validate_client_query("   a   ").is_err());
    }

    #[test]
    fn test_validate_store_id() {
        assert!(validate_store_id("BA001GC").is_ok());
        assert!(validate_store_id("").is_err());
        assert!(validate_store_id("BA 001").is_err());
    }

    #[test]
    fn test_validate_tax_id() {
        assert_eq!(validate_tax_id("20-12345678-9").unwrap(), "20123456789");
        assert_eq!(validate_tax_id("12345678").unwrap(), "12345678");
        assert!(validate_tax_id("123").is_err());
        assert!(validate_tax_id("sin numero").is_err());
    }

    #[test]
    fn test_validate_observations() {
        assert!(validate_observations("corta").is_ok());
        assert!(validate_observations(&"x".repeat(181)).is_err());
    }
}
