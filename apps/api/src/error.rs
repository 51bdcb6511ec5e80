//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Grill                                  │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Bad input? ──── ValidationError ─────────────┐                        │
//! │         │                                      │                        │
//! │         ▼                                      ▼                        │
//! │  Business rule? ─ CoreError ──────────────► ApiError ──► status + JSON │
//! │         │                                      ▲                        │
//! │         ▼                                      │                        │
//! │  Database? ───── DbError ─────────────────────┘                        │
//! │                                                                         │
//! │  400 VALIDATION_ERROR       404 NOT_FOUND                              │
//! │  409 INSUFFICIENT_STOCK     409 CONCURRENCY_CONFLICT                   │
//! │  401 UNAUTHORIZED           500 INTERNAL (details only in the log)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use grill_core::{CoreError, ValidationError};
use grill_db::DbError;
use serde::Serialize;

/// Error body returned to clients.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Only 10 of Classic Burger available, requested 12"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Offending input field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing caller identity (401)
    Unauthorized,

    /// Resource not found (404)
    NotFound,

    /// Not enough stock or availability (409)
    InsufficientStock,

    /// Stock lock wait timed out (409)
    ConcurrencyConflict,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock | ErrorCode::ConcurrencyConflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Generic 500; the caller logs the real cause.
    pub fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        ApiError::validation(err.to_string()).with_field(field)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::IngredientNotFound(id) => ApiError::not_found("Ingredient", &id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::Validation(e) => e.into(),
            e @ (CoreError::InsufficientAvailability { .. }
            | CoreError::InsufficientStock { .. }
            | CoreError::RequirementTooLarge { .. }) => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ CoreError::QuantityTooLarge { .. } => {
                ApiError::validation(e.to_string()).with_field("quantity")
            }
            e @ (CoreError::ProductUnavailable { .. }
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }) => ApiError::validation(e.to_string()),
            e @ CoreError::InvalidStatusTransition { .. } => {
                ApiError::validation(e.to_string()).with_field("status")
            }
            e @ CoreError::InvalidPromotion { .. } => {
                ApiError::validation(e.to_string()).with_field("promo_code")
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Domain(e) => e.into(),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value)).with_field(field)
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::validation("Record is referenced elsewhere or refers to a missing record")
            }
            DbError::Conflict => ApiError::new(
                ErrorCode::ConcurrencyConflict,
                "Another update is in progress, please retry",
            ),
            e @ (DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_)) => {
                tracing::error!(error = %e, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use grill_core::Quantity;

    #[test]
    fn test_stock_errors_are_conflicts() {
        let err: ApiError = DbError::Domain(CoreError::InsufficientStock {
            ingredient: "Bun".to_string(),
            on_hand: Quantity::zero(),
            required: Quantity::from_whole(1),
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("Bun"));

        let err: ApiError = DbError::Conflict.into();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_carries_field() {
        let err: ApiError = ValidationError::Required {
            field: "reason".to_string(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("reason"));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field"], "reason");
    }

    #[test]
    fn test_rejected_promotion_points_at_the_code() {
        let err: ApiError = DbError::Domain(CoreError::InvalidPromotion {
            code: "SUMMER".to_string(),
        })
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("promo_code"));
        assert!(err.message.contains("SUMMER"));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err: ApiError = DbError::QueryFailed("no such table: secrets".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(!err.message.contains("secrets"));

        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_not_found() {
        let err: ApiError = DbError::not_found("Order", "abc").into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Order not found: abc");
    }
}
