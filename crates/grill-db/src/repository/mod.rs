//! # Repository Module
//!
//! Database repository implementations for Grill.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Services                            │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().menu(policy, true)                              │
//! │       │  db.checkout(options).checkout(user, details)                  │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────┐     ┌──────────────────────────────┐     │
//! │  │ Repositories (this mod)  │     │ Services (crate::service)    │     │
//! │  │ one table family each,   │     │ anything that reads stock to │     │
//! │  │ plain pool queries       │     │ change it, under the lock    │     │
//! │  └────────────┬─────────────┘     └──────────────┬───────────────┘     │
//! │               │                                  │                     │
//! │               ▼                                  ▼                     │
//! │                         SQLite Database                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`] - Menu sections
//! - [`ProductRepository`] - Product CRUD, menu and availability
//! - [`RecipeRepository`] - Bill of materials with line costs
//! - [`IngredientRepository`] - Ingredient reads and inventory summary
//! - [`MovementRepository`] - Stock movement history
//! - [`CartRepository`] - Cart view and removal
//! - [`OrderRepository`] - Order reads, status updates, invoices
//! - [`UserRepository`] - Customer and staff profiles
//! - [`ProductStockRepository`] - Finished-goods stock
//! - [`PromotionRepository`] - Discount codes

pub mod cart;
pub mod category;
pub mod ingredient;
pub mod movement;
pub mod order;
pub mod product;
pub mod product_stock;
pub mod promotion;
pub mod recipe;
pub mod user;

pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use ingredient::{IngredientRepository, InventorySummary};
pub use movement::{MovementRepository, DEFAULT_HISTORY_LIMIT};
pub use order::OrderRepository;
pub use product::{MenuItem, ProductRepository};
pub use product_stock::ProductStockRepository;
pub use promotion::PromotionRepository;
pub use recipe::{ProductRecipe, RecipeLineView, RecipeRepository};
pub use user::UserRepository;
