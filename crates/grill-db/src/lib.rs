//! # grill-db: Database Layer for Grill
//!
//! This crate provides database access for the Grill ordering backend.
//! It uses SQLite with sqlx for async operations, and owns every
//! transaction that changes ingredient stock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Grill Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/cart/checkout)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     grill-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │   Services    │   │   │
//! │  │   │   (pool.rs)   │   │ catalog, carts │   │ cart, checkout│   │   │
//! │  │   │               │◄──│ orders, users  │   │ inventory     │   │   │
//! │  │   │  SqlitePool   │   │ movements ...  │   │ (stock lock)  │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │           ▲                                        │            │   │
//! │  │           └──────── Migrations (embedded) ─────────┘            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`service`] - Stock transactions (cart, checkout, inventory)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grill_db::{CheckoutOptions, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("grill.db")).await?;
//!
//! let menu = db.products().menu(StockPolicy::default(), true).await?;
//! let order = db
//!     .checkout(CheckoutOptions::default())
//!     .checkout(&user_id, details)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

mod stock;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{CartService, CheckoutOptions, CheckoutService, InventoryService};

// Repository re-exports for convenience
pub use repository::{
    CartRepository, CategoryRepository, IngredientRepository, InventorySummary, MenuItem,
    MovementRepository, OrderRepository, ProductRecipe, ProductRepository,
    ProductStockRepository, PromotionRepository, RecipeLineView, RecipeRepository,
    UserRepository, DEFAULT_HISTORY_LIMIT,
};
