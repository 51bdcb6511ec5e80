//! # Cart Reservations
//!
//! Adding to or changing a cart line reserves stock: the new quantity must
//! fit in what the ingredients can make after every OTHER cart's claim.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(user, { product, qty: 2 })                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN + inventory write lock                                           │
//! │       │                                                                 │
//! │       ├── user exists?              no → NotFound                       │
//! │       ├── product exists?           no → NotFound                       │
//! │       ├── resulting qty 1..=999?    no → QuantityTooLarge / Validation  │
//! │       ├── ≤ 100 distinct products?  no → CartTooLarge                   │
//! │       ├── effectively available?    no → ProductUnavailable             │
//! │       ├── qty ≤ net availability?   no → InsufficientAvailability       │
//! │       ▼                                                                 │
//! │  UPSERT cart_items → COMMIT                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any rejection rolls back with nothing written.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use super::CheckoutOptions;
use crate::error::{DbError, DbResult};
use crate::repository::product_stock;
use crate::repository::CartRepository;
use crate::stock::{begin_stock_transaction, ensure_user, load_requirements};
use grill_core::availability::product_is_available;
use grill_core::cart::{check_capacity, CartChange, CartSummary};
use grill_core::input::AddCartItem;
use grill_core::{Availability, CoreError, Product};

#[derive(Debug, Clone)]
pub struct CartService {
    pool: SqlitePool,
    options: CheckoutOptions,
}

impl CartService {
    pub fn new(pool: SqlitePool, options: CheckoutOptions) -> Self {
        CartService { pool, options }
    }

    /// Adds `item.quantity` units, on top of any already in the cart.
    pub async fn add_item(&self, user_id: &str, item: AddCartItem) -> DbResult<CartSummary> {
        self.apply(user_id, &item.product_id, CartChange::Add(item.quantity))
            .await
    }

    /// Replaces the quantity of a line already in the cart.
    pub async fn set_quantity(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<CartSummary> {
        self.apply(user_id, product_id, CartChange::Set(quantity))
            .await
    }

    async fn apply(&self, user_id: &str, product_id: &str, change: CartChange) -> DbResult<CartSummary> {
        let mut tx = begin_stock_transaction(&self.pool).await?;

        ensure_user(&mut *tx, user_id).await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, name, description, price_cents, image_url,
                   is_available, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        if matches!(change, CartChange::Set(_)) && existing.is_none() {
            return Err(DbError::not_found("Cart item", product_id));
        }

        let quantity = change.resulting_quantity(existing)?;

        if existing.is_none() {
            let distinct: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = ?1")
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            check_capacity(usize::try_from(distinct).unwrap_or(usize::MAX), true)?;
        }

        let requirements = load_requirements(&mut *tx, product_id, Some(user_id)).await?;

        if !product_is_available(&product, &requirements, self.options.stock_policy) {
            warn!(user_id = %user_id, product_id = %product_id, "Rejected cart change: product unavailable");
            return Err(CoreError::ProductUnavailable {
                product: product.name,
            }
            .into());
        }

        let availability = Availability::net_of_reservations(&requirements);
        if !availability.allows(quantity) {
            warn!(
                user_id = %user_id,
                product_id = %product_id,
                requested = quantity,
                available = ?availability.units(),
                "Rejected cart change: insufficient availability"
            );
            return Err(CoreError::InsufficientAvailability {
                product: product.name,
                available: availability.units().unwrap_or(0),
                requested: quantity,
            }
            .into());
        }

        if self.options.track_finished_goods {
            check_finished_goods(&mut *tx, &product, user_id, quantity).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(user_id, product_id) DO UPDATE SET
                quantity = excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            product_id = %product_id,
            quantity,
            previous = ?existing,
            "Cart updated"
        );

        CartRepository::new(self.pool.clone()).summary(user_id).await
    }
}

/// Tracked finished goods cap the line at stock minus other carts' claims.
async fn check_finished_goods(
    conn: &mut SqliteConnection,
    product: &Product,
    user_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let Some(stock) = product_stock::load(&mut *conn, &product.id).await? else {
        return Ok(());
    };

    let reserved: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE product_id = ?1 AND user_id != ?2",
    )
    .bind(&product.id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    let available = (stock.stock - reserved).max(0);
    if quantity > available {
        warn!(product_id = %product.id, available, requested = quantity, "Rejected cart change: finished goods");
        return Err(CoreError::InsufficientAvailability {
            product: product.name.clone(),
            available,
            requested: quantity,
        }
        .into());
    }
    Ok(())
}
