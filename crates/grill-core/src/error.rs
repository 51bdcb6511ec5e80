//! # Error Types
//!
//! Domain-specific error types for grill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  grill-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  grill-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures (wraps CoreError)            │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (JSON + status code)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::order::OrderStatus;
use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Ingredient does not exist (or is inactive).
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    /// Order does not exist or does not belong to the caller.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Product is switched off by staff or blocked by the stock policy.
    #[error("{product} is not available right now")]
    ProductUnavailable { product: String },

    /// Requested more units than current stock (net of other carts) can make.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 12)
    ///      │
    ///      ▼
    /// Recipe: 1 Bun per burger, Bun stock = 10
    ///      │
    ///      ▼
    /// InsufficientAvailability { product: "Burger", available: 10, requested: 12 }
    /// ```
    #[error("Only {available} of {product} available, requested {requested}")]
    InsufficientAvailability {
        product: String,
        available: i64,
        requested: i64,
    },

    /// An ingredient cannot cover what an order consumes.
    ///
    /// Raised by checkout; the whole order is rolled back.
    #[error("Insufficient stock of {ingredient}: {on_hand} on hand, {required} required")]
    InsufficientStock {
        ingredient: String,
        on_hand: Quantity,
        required: Quantity,
    },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed distinct products.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// What an order consumes of one ingredient cannot be represented.
    #[error("Requirement for ingredient {ingredient_id} is too large")]
    RequirementTooLarge { ingredient_id: String },

    /// Unknown, inactive or out-of-window promotion code.
    #[error("Promotion code {code} is not valid")]
    InvalidPromotion { code: String },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Order status cannot move from `from` to `to`.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the offending field so the API can return
/// field-level messages.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Quantity above what the schema stores.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Quantity },

    /// Invalid format (e.g., invalid UUID, invalid decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate ingredient name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// The field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::TooLarge { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
