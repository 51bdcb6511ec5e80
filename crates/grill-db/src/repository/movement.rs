//! # Inventory Movement Repository
//!
//! The append-only stock ledger. Rows are written only from inside stock
//! transactions (checkout, adjustment, ingredient create/edit), through
//! [`record`], so a movement never exists without the change it describes.
//!
//! ```text
//!   kind         change    before → after   reason
//!   ──────────   ───────   ──────────────   ──────────────────
//!   in           +48.00      0.00 → 48.00   Ingredient created
//!   out          -10.00     48.00 → 38.00   Order #7
//!   adjustment    -3.00     38.00 → 35.00   Dropped a tray
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use grill_core::{InventoryMovement, MovementKind, Quantity};

/// Default page size for history listings.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// A movement about to be recorded.
#[derive(Debug, Clone)]
pub(crate) struct NewMovement<'a> {
    pub ingredient_id: &'a str,
    pub kind: MovementKind,
    pub stock_before: Quantity,
    pub stock_after: Quantity,
    pub reason: &'a str,
    pub user_id: Option<&'a str>,
    pub order_id: Option<&'a str>,
}

/// Appends one movement on the caller's transaction.
pub(crate) async fn record(
    conn: &mut SqliteConnection,
    movement: NewMovement<'_>,
) -> DbResult<InventoryMovement> {
    let row = InventoryMovement {
        id: Uuid::new_v4().to_string(),
        ingredient_id: movement.ingredient_id.to_string(),
        kind: movement.kind,
        change: movement.stock_after - movement.stock_before,
        stock_before: movement.stock_before,
        stock_after: movement.stock_after,
        reason: movement.reason.to_string(),
        user_id: movement.user_id.map(str::to_string),
        order_id: movement.order_id.map(str::to_string),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO inventory_movements (
            id, ingredient_id, kind, change, stock_before, stock_after,
            reason, user_id, order_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&row.id)
    .bind(&row.ingredient_id)
    .bind(row.kind)
    .bind(row.change)
    .bind(row.stock_before)
    .bind(row.stock_after)
    .bind(&row.reason)
    .bind(&row.user_id)
    .bind(&row.order_id)
    .bind(row.created_at)
    .execute(conn)
    .await?;

    debug!(
        ingredient_id = %row.ingredient_id,
        kind = ?row.kind,
        change = %row.change,
        "Movement recorded"
    );
    Ok(row)
}

#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Movement history, newest first, optionally for one ingredient.
    pub async fn list(&self, ingredient_id: Option<&str>, limit: i64) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, ingredient_id, kind, change, stock_before, stock_after,
                   reason, user_id, order_id, created_at
            FROM inventory_movements
            WHERE (?1 IS NULL OR ingredient_id = ?1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(ingredient_id)
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = movements.len(), "Listed movements");
        Ok(movements)
    }

    /// Every movement written for one order, in the order they were made.
    pub async fn for_order(&self, order_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(
            r#"
            SELECT id, ingredient_id, kind, change, stock_before, stock_after,
                   reason, user_id, order_id, created_at
            FROM inventory_movements
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
