//! # Checkout
//!
//! Turns a cart into an order and consumes the ingredients it needs, in one
//! transaction.
//!
//! ## Transaction Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN + inventory write lock                                           │
//! │    │                                                                    │
//! │    1. snapshot cart lines (insertion order); empty → EmptyCart          │
//! │    2. load recipes (line order) and current ingredient stock            │
//! │    3. plan_consumption: aggregate per ingredient, first shortfall       │
//! │       → InsufficientStock, nothing written                              │
//! │       stock policy blocks a product → ProductUnavailable                │
//! │    4. promo code: unknown / inactive / expired → InvalidPromotion       │
//! │       INSERT order (discount snapshot) + lines (name and price frozen)  │
//! │    5. per ingredient: guarded UPDATE stock, INSERT movement (out)       │
//! │    6. tracked finished goods: deduct + history                          │
//! │    7. DELETE cart lines                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction: no order, no            │
//! │  deductions, cart untouched.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use super::CheckoutOptions;
use crate::error::{DbError, DbResult};
use crate::repository::movement::{self, NewMovement};
use crate::repository::{product_stock, promotion};
use crate::stock::{begin_stock_transaction, deduct_ingredient, ensure_user, load_requirements};
use grill_core::availability::blocking_ingredient;
use grill_core::consumption::{plan_consumption, IngredientStock, PurchaseLine, RecipeRequirement};
use grill_core::order::CheckoutDetails;
use grill_core::{
    CoreError, Money, MovementKind, Order, OrderLine, OrderStatus, OrderWithLines, Promotion,
    Quantity,
};

/// A cart line joined with the product as it is right now.
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: String,
    name: String,
    price_cents: i64,
    is_available: bool,
    quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    ingredient_id: String,
    quantity_per_unit: Quantity,
}

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: String,
    name: String,
    stock: Quantity,
}

#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    options: CheckoutOptions,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, options: CheckoutOptions) -> Self {
        CheckoutService { pool, options }
    }

    /// Places an order for everything in the caller's cart.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown user
    /// - `EmptyCart`, `ProductUnavailable`
    /// - `InsufficientStock` naming the first short ingredient
    /// - `InsufficientAvailability` for short tracked finished goods
    /// - `InvalidPromotion` for an unknown, inactive or expired code
    /// - `Conflict` when the stock lock could not be taken in time
    pub async fn checkout(&self, user_id: &str, details: CheckoutDetails) -> DbResult<OrderWithLines> {
        let mut tx = begin_stock_transaction(&self.pool).await?;

        ensure_user(&mut *tx, user_id).await?;

        // 1. Cart snapshot
        let cart = sqlx::query_as::<_, CheckoutLine>(
            r#"
            SELECT c.product_id, p.name, p.price_cents, p.is_available, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY c.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        if let Some(off) = cart.iter().find(|line| !line.is_available) {
            warn!(user_id = %user_id, product_id = %off.product_id, "Checkout rejected: product unavailable");
            return Err(CoreError::ProductUnavailable {
                product: off.name.clone(),
            }
            .into());
        }

        // 2-3. Plan deductions
        let purchases = load_purchases(&mut *tx, &cart).await?;
        let stock = load_stock(&mut *tx, &purchases).await?;
        let plan = plan_consumption(&purchases, &stock).map_err(|err| {
            warn!(user_id = %user_id, error = %err, "Checkout rejected");
            DbError::from(err)
        })?;
        self.check_stock_policy(&mut *tx, user_id, &cart).await?;

        // 4. Order header and lines
        let order_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(order_number), 0) + 1 FROM orders")
                .fetch_one(&mut *tx)
                .await?;
        let now = Utc::now();
        let subtotal: Money = cart
            .iter()
            .map(|line| Money::from_cents(line.price_cents).multiply_quantity(line.quantity))
            .sum();

        let promotion = match details.promo_code.as_deref() {
            Some(code) => Some(load_promotion(&mut *tx, user_id, code).await?),
            None => None,
        };
        let discount = match &promotion {
            Some(promotion) => promotion.apply(subtotal, now).map_err(|err| {
                warn!(user_id = %user_id, code = %promotion.code, "Checkout rejected: promotion not valid now");
                DbError::from(err)
            })?,
            None => Money::zero(),
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number,
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            delivery_type: details.delivery_type,
            payment_method: details.payment_method,
            delivery_address: details.delivery_address,
            notes: details.notes,
            promotion_id: promotion.as_ref().map(|p| p.id.clone()),
            promotion_code: promotion.as_ref().map(|p| p.code.clone()),
            discount_cents: discount.cents(),
            total_cents: (subtotal - discount).cents(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, user_id, status, delivery_type, payment_method,
                delivery_address, notes, promotion_id, promotion_code, discount_cents,
                total_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(order.order_number)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.delivery_type)
        .bind(order.payment_method)
        .bind(&order.delivery_address)
        .bind(&order.notes)
        .bind(&order.promotion_id)
        .bind(&order.promotion_code)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(cart.len());
        for (position, item) in cart.iter().enumerate() {
            let line = OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                product_id: Some(item.product_id.clone()),
                name_snapshot: item.name.clone(),
                unit_price_cents: item.price_cents,
                quantity: item.quantity,
                line_total_cents: Money::from_cents(item.price_cents)
                    .multiply_quantity(item.quantity)
                    .cents(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, product_id, name_snapshot, unit_price_cents,
                    quantity, line_total_cents, position, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(&line.name_snapshot)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.line_total_cents)
            .bind(position as i64)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;

            lines.push(line);
        }

        // 5. Ingredient deductions and their movements
        let reason = format!("Order #{order_number}");
        for deduction in &plan {
            deduct_ingredient(
                &mut *tx,
                &deduction.ingredient_id,
                &deduction.ingredient_name,
                deduction.amount,
                deduction.stock_before,
            )
            .await?;

            movement::record(
                &mut *tx,
                NewMovement {
                    ingredient_id: &deduction.ingredient_id,
                    kind: MovementKind::Out,
                    stock_before: deduction.stock_before,
                    stock_after: deduction.stock_after,
                    reason: &reason,
                    user_id: Some(user_id),
                    order_id: Some(&order.id),
                },
            )
            .await?;
        }

        // 6. Finished goods
        if self.options.track_finished_goods {
            for item in &cart {
                deduct_finished_goods(&mut *tx, item, &reason, &order.id).await?;
            }
        }

        // 7. Clear the cart
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_number,
            user_id = %user_id,
            lines = lines.len(),
            deductions = plan.len(),
            discount = %discount,
            total = %order.total(),
            "Order placed"
        );

        Ok(OrderWithLines { order, lines })
    }

    /// Rejects the order if the stock policy switched off any product in
    /// it since it was put in the cart.
    async fn check_stock_policy(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        cart: &[CheckoutLine],
    ) -> DbResult<()> {
        for item in cart {
            let requirements = load_requirements(&mut *conn, &item.product_id, None).await?;
            if let Some(blocked) = blocking_ingredient(&requirements, self.options.stock_policy) {
                warn!(
                    user_id = %user_id,
                    product_id = %item.product_id,
                    ingredient = %blocked.ingredient_name,
                    policy = %self.options.stock_policy,
                    "Checkout rejected: product unavailable"
                );
                return Err(CoreError::ProductUnavailable {
                    product: item.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

async fn load_promotion(conn: &mut SqliteConnection, user_id: &str, code: &str) -> DbResult<Promotion> {
    match promotion::find_by_code(conn, code).await? {
        Some(found) => Ok(found),
        None => {
            warn!(user_id = %user_id, code = %code, "Checkout rejected: unknown promotion");
            Err(CoreError::InvalidPromotion {
                code: code.to_string(),
            }
            .into())
        }
    }
}

async fn load_purchases(conn: &mut SqliteConnection, cart: &[CheckoutLine]) -> DbResult<Vec<PurchaseLine>> {
    let mut purchases = Vec::with_capacity(cart.len());

    for item in cart {
        let recipe = sqlx::query_as::<_, RecipeRow>(
            "SELECT ingredient_id, quantity_per_unit FROM recipe_lines
             WHERE product_id = ?1 ORDER BY position",
        )
        .bind(&item.product_id)
        .fetch_all(&mut *conn)
        .await?;

        purchases.push(PurchaseLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            recipe: recipe
                .into_iter()
                .map(|row| RecipeRequirement {
                    ingredient_id: row.ingredient_id,
                    per_unit: row.quantity_per_unit,
                })
                .collect(),
        });
    }

    Ok(purchases)
}

async fn load_stock(
    conn: &mut SqliteConnection,
    purchases: &[PurchaseLine],
) -> DbResult<HashMap<String, IngredientStock>> {
    let mut stock = HashMap::new();

    for requirement in purchases.iter().flat_map(|p| &p.recipe) {
        if stock.contains_key(&requirement.ingredient_id) {
            continue;
        }
        let row = sqlx::query_as::<_, StockRow>("SELECT id, name, stock FROM ingredients WHERE id = ?1")
            .bind(&requirement.ingredient_id)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(row) = row {
            stock.insert(
                row.id.clone(),
                IngredientStock {
                    ingredient_id: row.id,
                    name: row.name,
                    on_hand: row.stock,
                },
            );
        }
    }

    Ok(stock)
}

async fn deduct_finished_goods(
    conn: &mut SqliteConnection,
    item: &CheckoutLine,
    reason: &str,
    order_id: &str,
) -> DbResult<()> {
    let Some(tracked) = product_stock::load(&mut *conn, &item.product_id).await? else {
        return Ok(());
    };

    if tracked.stock < item.quantity {
        warn!(product_id = %item.product_id, stock = tracked.stock, requested = item.quantity, "Checkout rejected: finished goods");
        return Err(CoreError::InsufficientAvailability {
            product: item.name.clone(),
            available: tracked.stock,
            requested: item.quantity,
        }
        .into());
    }

    let after = tracked.stock - item.quantity;
    sqlx::query("UPDATE product_stock SET stock = ?1, updated_at = ?2 WHERE product_id = ?3")
        .bind(after)
        .bind(Utc::now())
        .bind(&item.product_id)
        .execute(&mut *conn)
        .await?;

    product_stock::record_history(conn, &item.product_id, -item.quantity, after, reason, Some(order_id)).await
}
