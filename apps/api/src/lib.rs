//! # Grill API
//!
//! HTTP server for the restaurant ordering backend.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Grill API Routes                                │
//! │                                                                         │
//! │  Catalog                         Inventory (staff)                      │
//! │  ───────                         ─────────────────                      │
//! │  GET    /api/menu                GET/POST   /api/ingredients            │
//! │  GET    /api/products            GET/PUT/DELETE /api/ingredients/{id}   │
//! │  POST   /api/products            POST   /api/ingredients/{id}/adjust    │
//! │  GET/PUT/DELETE /api/products/{id}   GET /api/inventory/summary         │
//! │  GET    /api/products/{id}/availability  GET /api/inventory/movements   │
//! │  GET/POST /api/products/{id}/recipe  GET /api/inventory/restock         │
//! │  GET/PUT  /api/products/{id}/stock                                      │
//! │  DELETE /api/recipes/{id}                                               │
//! │  GET/POST /api/categories, DELETE /api/categories/{id}                  │
//! │  GET/POST /api/promotions, GET/PUT/DELETE /api/promotions/{id}          │
//! │                                                                         │
//! │  Cart & Orders (x-user-id)       Staff orders                           │
//! │  ─────────────────────────       ────────────                           │
//! │  GET    /api/cart                GET /api/staff/orders?status=          │
//! │  POST   /api/cart/items          PUT /api/staff/orders/{id}/status      │
//! │  PUT/DELETE /api/cart/items/{product_id}                                │
//! │  POST   /api/cart/checkout       Users                                  │
//! │  GET    /api/orders              ─────                                  │
//! │  GET    /api/orders/{id}         POST /api/users                        │
//! │  GET    /api/orders/{id}/invoice GET  /api/users/me                     │
//! │                                                                         │
//! │  GET /health                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables:
//! - `GRILL_CONFIG` - optional TOML file
//! - `GRILL_HOST`, `GRILL_PORT` - bind address (default 0.0.0.0:8080)
//! - `GRILL_DATABASE_PATH` - SQLite file (default ./grill.db)
//! - `GRILL_MAX_CONNECTIONS`, `GRILL_BUSY_TIMEOUT_SECS` - pool tuning
//! - `GRILL_STOCK_POLICY` - `depleted_only` or `low_or_depleted`
//! - `GRILL_TRACK_FINISHED_GOODS` - `true` to deduct product stock

use axum::routing::{delete, get, post, put};
use axum::Router;
use grill_db::{CheckoutOptions, Database};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub options: CheckoutOptions,
}

impl AppState {
    pub fn new(db: Database, options: CheckoutOptions) -> Self {
        AppState { db, options }
    }
}

/// Builds the full router with request tracing.
pub fn build_router(state: AppState) -> Router {
    use handlers::{cart, catalog, health, inventory, orders, promotions, users};

    let api = Router::new()
        // Catalog
        .route("/menu", get(catalog::menu))
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route(
            "/products/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route("/products/{id}/availability", get(catalog::availability))
        .route(
            "/products/{id}/recipe",
            get(catalog::get_recipe).post(catalog::add_recipe_lines),
        )
        .route(
            "/products/{id}/stock",
            get(catalog::get_product_stock).put(catalog::set_product_stock),
        )
        .route("/recipes/{id}", delete(catalog::delete_recipe_line))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/categories/{id}", delete(catalog::delete_category))
        // Promotions
        .route(
            "/promotions",
            get(promotions::list_promotions).post(promotions::create_promotion),
        )
        .route(
            "/promotions/{id}",
            get(promotions::get_promotion)
                .put(promotions::update_promotion)
                .delete(promotions::delete_promotion),
        )
        // Inventory
        .route(
            "/ingredients",
            get(inventory::list_ingredients).post(inventory::create_ingredient),
        )
        .route(
            "/ingredients/{id}",
            get(inventory::get_ingredient)
                .put(inventory::update_ingredient)
                .delete(inventory::delete_ingredient),
        )
        .route("/ingredients/{id}/adjust", post(inventory::adjust_stock))
        .route("/inventory/summary", get(inventory::summary))
        .route("/inventory/movements", get(inventory::movements))
        .route("/inventory/restock", get(inventory::restock))
        // Cart
        .route("/cart", get(cart::get_cart))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{product_id}",
            put(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/cart/checkout", post(cart::checkout))
        // Orders
        .route("/orders", get(orders::list_mine))
        .route("/orders/{id}", get(orders::get_mine))
        .route("/orders/{id}/invoice", get(orders::invoice))
        .route("/staff/orders", get(orders::list_all))
        .route("/staff/orders/{id}/status", put(orders::update_status))
        // Users
        .route("/users", post(users::register))
        .route("/users/me", get(users::me));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
