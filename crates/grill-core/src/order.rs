//! # Order Rules
//!
//! The order status machine and the typed checkout request.
//!
//! ## Status Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   checkout                                                              │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌─────────┐    ┌───────────┐    ┌───────┐    ┌───────────┐            │
//! │  │ pending │───►│ preparing │───►│ ready │───►│ delivered │            │
//! │  └────┬────┘    └─────┬─────┘    └───────┘    └───────────┘            │
//! │       │               │                                                 │
//! │       │               ▼                                                 │
//! │       │         ┌───────────┐                                           │
//! │       └────────►│ cancelled │   (stock is NOT returned)                 │
//! │                 └───────────┘                                           │
//! │                                                                         │
//! │  Order lines and totals never change after checkout; only the status   │
//! │  field moves, and only along the arrows above.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::promotion::normalize_code;
use crate::types::{DeliveryType, PaymentMethod};
use crate::validation::{validate_optional_text, ValidationResult};

/// Maximum length of a delivery address.
pub const MAX_ADDRESS_LENGTH: usize = 255;

/// Maximum length of free-form order notes.
pub const MAX_NOTES_LENGTH: usize = 500;

// =============================================================================
// Order Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Just placed, kitchen has not started.
    Pending,
    Preparing,
    /// Waiting for pickup or courier.
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether staff may move an order from `self` to `next`.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Preparing, OrderStatus::Cancelled)
        )
    }

    /// Terminal states accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Validates a transition for the given order.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::order::OrderStatus;
    ///
    /// let next = OrderStatus::Pending.transition("o-1", OrderStatus::Preparing).unwrap();
    /// assert_eq!(next, OrderStatus::Preparing);
    /// assert!(OrderStatus::Delivered.transition("o-1", OrderStatus::Pending).is_err());
    /// ```
    pub fn transition(&self, order_id: &str, next: OrderStatus) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                from: *self,
                to: next,
            })
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// What the customer submits at checkout.
///
/// Deserialized straight from the request body; enum fields reject
/// unknown values before this struct exists.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub promo_code: Option<String>,
}

/// A checkout request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    /// Present only for home delivery.
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    /// Normalized upper-case; `None` when blank or absent.
    pub promo_code: Option<String>,
}

impl CheckoutRequest {
    /// Validates and normalizes the request.
    ///
    /// ## Rules
    /// - Home delivery requires a non-blank address
    /// - Pickup orders drop any address that was sent
    /// - Address ≤ 255 chars, notes ≤ 500 chars
    /// - A non-blank promo code must be well-formed
    pub fn validate(self) -> ValidationResult<CheckoutDetails> {
        let address =
            validate_optional_text("delivery_address", self.delivery_address, MAX_ADDRESS_LENGTH)?;
        let notes = validate_optional_text("notes", self.notes, MAX_NOTES_LENGTH)?;

        let delivery_address = match self.delivery_type {
            DeliveryType::Delivery => Some(address.ok_or_else(|| ValidationError::Required {
                field: "delivery_address".to_string(),
            })?),
            DeliveryType::Pickup => None,
        };

        let promo_code = match self.promo_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(normalize_code("promo_code", code)?),
            _ => None,
        };

        Ok(CheckoutDetails {
            delivery_type: self.delivery_type,
            payment_method: self.payment_method,
            delivery_address,
            notes,
            promo_code,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
