//! # Stock Locking & Shared Stock Queries
//!
//! SQLite has no row locks. Every transaction that reads stock in order to
//! change it opens with a write to the single-row `inventory_revision`
//! table, which takes the database write lock BEFORE any stock is read.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Checkout A                         Checkout B                         │
//! │   ──────────                         ──────────                         │
//! │   BEGIN                              BEGIN                              │
//! │   UPDATE inventory_revision  ✓       UPDATE inventory_revision  ⏳      │
//! │   read stock (Bun = 1)               (waits, busy_timeout)              │
//! │   deduct 1 → 0                            │                             │
//! │   COMMIT ───────────────────────────────► ✓ lock acquired              │
//! │                                      read stock (Bun = 0)               │
//! │                                      plan fails → InsufficientStock    │
//! │                                      ROLLBACK                           │
//! │                                                                         │
//! │   Lock wait longer than busy_timeout → DbError::Conflict               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use grill_core::availability::StockedRequirement;
use grill_core::Quantity;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};

/// Opens a transaction that already holds the inventory write lock.
pub(crate) async fn begin_stock_transaction(
    pool: &SqlitePool,
) -> DbResult<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE inventory_revision SET revision = revision + 1 WHERE id = 1")
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

const REQUIREMENT_COLUMNS: &str = r#"
    r.ingredient_id AS ingredient_id,
    i.name AS ingredient_name,
    r.quantity_per_unit AS per_unit,
    i.stock AS on_hand,
    i.minimum_stock AS minimum,
    COALESCE((
        SELECT SUM(c.quantity * r2.quantity_per_unit)
        FROM cart_items c
        JOIN recipe_lines r2 ON r2.product_id = c.product_id
        WHERE r2.ingredient_id = r.ingredient_id
          AND NOT (c.user_id = ?1 AND c.product_id = r.product_id)
    ), 0) AS reserved
"#;

/// Recipe lines of one product joined with ingredient stock, in recipe
/// order, with reservations from every cart line except `exclude_user`'s
/// line for this product.
pub(crate) async fn load_requirements(
    conn: &mut SqliteConnection,
    product_id: &str,
    exclude_user: Option<&str>,
) -> DbResult<Vec<StockedRequirement>> {
    let sql = format!(
        "SELECT {REQUIREMENT_COLUMNS}
         FROM recipe_lines r
         JOIN ingredients i ON i.id = r.ingredient_id
         WHERE r.product_id = ?2
         ORDER BY r.position"
    );

    let rows = sqlx::query_as::<_, StockedRequirement>(&sql)
        .bind(exclude_user.unwrap_or(""))
        .bind(product_id)
        .fetch_all(conn)
        .await?;

    Ok(rows)
}

#[derive(sqlx::FromRow)]
struct ProductRequirementRow {
    product_id: String,
    #[sqlx(flatten)]
    requirement: StockedRequirement,
}

/// Requirements of every product with a recipe, reservations from all carts.
pub(crate) async fn load_all_requirements(
    conn: &mut SqliteConnection,
) -> DbResult<HashMap<String, Vec<StockedRequirement>>> {
    let sql = format!(
        "SELECT r.product_id AS product_id, {REQUIREMENT_COLUMNS}
         FROM recipe_lines r
         JOIN ingredients i ON i.id = r.ingredient_id
         ORDER BY r.product_id, r.position"
    );

    let rows = sqlx::query_as::<_, ProductRequirementRow>(&sql)
        .bind("")
        .fetch_all(conn)
        .await?;

    let mut by_product: HashMap<String, Vec<StockedRequirement>> = HashMap::new();
    for row in rows {
        by_product
            .entry(row.product_id)
            .or_default()
            .push(row.requirement);
    }
    Ok(by_product)
}

/// Deducts `amount` only if the stock covers it.
pub(crate) async fn deduct_ingredient(
    conn: &mut SqliteConnection,
    ingredient_id: &str,
    ingredient_name: &str,
    amount: Quantity,
    on_hand: Quantity,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE ingredients
         SET stock = stock - ?1, updated_at = ?2
         WHERE id = ?3 AND stock >= ?1",
    )
    .bind(amount)
    .bind(chrono::Utc::now())
    .bind(ingredient_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::Domain(grill_core::CoreError::InsufficientStock {
            ingredient: ingredient_name.to_string(),
            on_hand,
            required: amount,
        }));
    }
    Ok(())
}

/// Fails with NotFound unless the user is registered.
pub(crate) async fn ensure_user(conn: &mut SqliteConnection, user_id: &str) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("User", user_id)),
    }
}
