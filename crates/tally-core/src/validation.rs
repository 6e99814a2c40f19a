//! # Validation Module
//!
//! Field-level validation rules for bill input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                      │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE via Bill::validate — every problem collected at once   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The functions here check a single field and return a single error;
//! [`crate::bill::Bill::validate`] runs them all and collects the results
//! instead of short-circuiting.

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT_MINOR, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_TIP_RATE_BPS};

/// Result type for single-field validation.
pub type ValidationResult = Result<(), ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (participant, item, or bill title).
///
/// ## Rules
/// - Non-empty after trimming
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_name;
///
/// assert!(validate_name("title", "Team dinner").is_ok());
/// assert!(validate_name("title", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (≥ 1)
/// - Must not exceed [`MAX_ITEM_QUANTITY`] (catches "1000" typed for "10")
pub fn validate_quantity(qty: i64) -> ValidationResult {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (zero is allowed: comped items)
/// - Must not exceed the overflow guard
pub fn validate_price(price: Money) -> ValidationResult {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    if price.minor() > MAX_AMOUNT_MINOR {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_AMOUNT_MINOR,
        });
    }

    Ok(())
}

/// Validates a percentage tip rate in basis points.
///
/// ## Rules
/// - At most [`MAX_TIP_RATE_BPS`] (100%) — a tip larger than the bill
///   itself is assumed to be a typo
pub fn validate_tip_rate_bps(bps: u32) -> ValidationResult {
    if bps > MAX_TIP_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tip_rate".to_string(),
            min: 0,
            max: MAX_TIP_RATE_BPS as i64,
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
    fn test_validate_name() {
        assert!(validate_name("name", "Pizza Margherita").is_ok());
        assert!(validate_name("name", "  Alice  ").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_minor(1099)).is_ok());
        assert!(validate_price(Money::from_minor(-1)).is_err());
        assert!(validate_price(Money::from_minor(MAX_AMOUNT_MINOR + 1)).is_err());
    }

    #[test]
    fn test_validate_tip_rate() {
        assert!(validate_tip_rate_bps(0).is_ok());
        assert!(validate_tip_rate_bps(1000).is_ok());
        assert!(validate_tip_rate_bps(MAX_TIP_RATE_BPS).is_ok());
        assert!(validate_tip_rate_bps(MAX_TIP_RATE_BPS + 1).is_err());
    }
}
