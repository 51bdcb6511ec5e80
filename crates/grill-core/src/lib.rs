//! # grill-core: Pure Business Logic for Grill
//!
//! This crate is the **heart** of the Grill restaurant backend. It contains
//! the ordering and inventory rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Grill Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web frontend (menu, cart, admin)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ grill-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐   │   │
//! │  │  │ quantity   │ │availability│ │consumption │ │   order    │   │   │
//! │  │  │ money      │ │ StockPolicy│ │ plan       │ │  status    │   │   │
//! │  │  └────────────┘ └────────────┘ └────────────┘ └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    grill-db (Database Layer)                    │   │
//! │  │        SQLite, migrations, repositories, checkout transaction   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Ingredient, Product, Order, ...)
//! - [`quantity`] - Fixed-point ingredient quantities
//! - [`money`] - Money type with integer arithmetic
//! - [`availability`] - Units a product can sell, stock policy
//! - [`consumption`] - Per-ingredient deductions for a checkout
//! - [`cart`] - Cart mutation rules and cart view
//! - [`order`] - Order status machine, checkout request
//! - [`promotion`] - Discount codes applied at checkout
//! - [`invoice`] - Invoice data contract
//! - [`input`] - Validated request payloads
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use grill_core::availability::{Availability, StockedRequirement};
//! use grill_core::Quantity;
//!
//! let bun = StockedRequirement {
//!     ingredient_id: "bun".into(),
//!     ingredient_name: "Bun".into(),
//!     per_unit: Quantity::from_whole(1),
//!     on_hand: Quantity::from_whole(10),
//!     minimum: Quantity::from_whole(2),
//!     reserved: Quantity::from_whole(7),
//! };
//!
//! assert_eq!(Availability::for_recipe(&[bun.clone()]), Availability::Limited(10));
//! assert_eq!(Availability::net_of_reservations(&[bun]), Availability::Limited(3));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod cart;
pub mod consumption;
pub mod error;
pub mod input;
pub mod invoice;
pub mod money;
pub mod order;
pub mod promotion;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::{Availability, AvailabilityReport, StockPolicy};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::OrderStatus;
pub use promotion::Promotion;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in a cart.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of product, category and ingredient names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a stock adjustment justification.
pub const MAX_REASON_LENGTH: usize = 200;
