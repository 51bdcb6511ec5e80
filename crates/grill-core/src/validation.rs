//! # Validation Module
//!
//! Input validation utilities for Grill.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/api)                                     │
//! │  ├── JSON → typed request structs (serde)                              │
//! │  └── Unknown enum values rejected during deserialization               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, ranges, formats                                          │
//! │  └── Called once per request by the input structs' `validate()`        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (names, emails, recipe pairs)                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grill_core::validation::{validate_quantity, validate_reason};
//!
//! validate_quantity(5).unwrap();
//! assert_eq!(validate_reason("  weekly count ").unwrap(), "weekly count");
//! ```

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_REASON_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-limited text field and returns it trimmed.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional text field. Blank becomes `None`.
pub fn validate_optional_text(
    field: &str,
    value: Option<String>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => validate_required_text(field, text, max).map(Some),
    }
}

/// Validates a product or category name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_name(name: &str) -> ValidationResult<String> {
    validate_required_text("name", name, MAX_NAME_LENGTH)
}

/// Validates an ingredient name.
///
/// ## Rules
/// - Must not be empty, at most 100 characters
/// - Letters and spaces only (accented letters allowed)
///
/// ## Example
/// ```rust
/// use grill_core::validation::validate_ingredient_name;
///
/// assert!(validate_ingredient_name("Pan brioche").is_ok());
/// assert!(validate_ingredient_name("Jalapeño").is_ok());
/// assert!(validate_ingredient_name("Bun #2").is_err());
/// ```
pub fn validate_ingredient_name(name: &str) -> ValidationResult<String> {
    let name = validate_required_text("name", name, MAX_NAME_LENGTH)?;

    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must contain only letters and spaces".to_string(),
        });
    }

    Ok(name)
}

/// Validates the justification for a manual stock adjustment.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    validate_required_text("reason", reason, MAX_REASON_LENGTH)
}

/// Validates an email address (one `@`, non-empty local part, dotted domain).
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required_text("email", email, 254)?.to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.contains(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(email)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item                                                         │
/// │                                                                         │
/// │  Customer enters quantity: 5                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → availability check in grill-db                          │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
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

/// Validates a price in cents. Zero is allowed.
///
/// ## Example
/// ```rust
/// use grill_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price_cents", 1099).is_ok());
/// assert!(validate_price_cents("price_cents", 0).is_ok());
/// assert!(validate_price_cents("price_cents", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Stock levels and thresholds: zero is allowed, negative is not, and
/// nothing above [`Quantity::MAX`].
pub fn validate_non_negative(field: &str, value: Quantity) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    validate_storable(field, value)
}

/// Package sizes and recipe ratios must be strictly positive and at most
/// [`Quantity::MAX`].
///
/// ## Example
/// ```rust
/// use grill_core::quantity::Quantity;
/// use grill_core::validation::validate_positive;
///
/// assert!(validate_positive("quantity_per_unit", Quantity::from_hundredths(25)).is_ok());
/// assert!(validate_positive("quantity_per_unit", Quantity::MAX).is_ok());
/// assert!(validate_positive("quantity_per_unit", Quantity::from_hundredths(10_000_000_000)).is_err());
/// ```
pub fn validate_positive(field: &str, value: Quantity) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    validate_storable(field, value)
}

fn validate_storable(field: &str, value: Quantity) -> ValidationResult<()> {
    if value > Quantity::MAX {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Quantity::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use grill_core::validation::validate_uuid;
///
/// assert!(validate_uuid("user_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("user_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
