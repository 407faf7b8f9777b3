//! # Validation Module
//!
//! Input validation for Remedy. Every rule runs before storage is touched,
//! so a request that fails here has no observable side effect.
//!
//! ## Usage
//! ```rust
//! use remedy_core::validation::{validate_sale_quantity, validate_price};
//!
//! validate_sale_quantity(3).unwrap();
//! validate_price(2.0).unwrap();
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a login name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 64 characters
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 64,
        });
    }

    Ok(username.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested sale quantity.
///
/// ## Rules
/// - Must be positive (> 0); zero-unit and negative sales are rejected
///   before the transaction opens
pub fn validate_sale_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level supplied through inventory CRUD.
///
/// ## Rules
/// - Must not be negative; zero is allowed (out of stock)
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be a finite number
/// - Must not be negative; zero is allowed (free items)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
