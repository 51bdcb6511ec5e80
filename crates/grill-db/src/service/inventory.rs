//! # Inventory Service
//!
//! Ingredient lifecycle and manual stock corrections. Every change to
//! `stock` made here writes its movement in the same transaction.
//!
//! ```text
//!   operation           movement      reason
//!   ─────────────────   ───────────   ──────────────────────
//!   create_ingredient   in            "Ingredient created"
//!   update_ingredient   adjustment    "Manual stock edit"   (only if stock changed)
//!   adjust              adjustment    staff justification   (always, even 0 change;
//!                                                           active ingredients only)
//!   delete_ingredient   -             recipes and movements cascade
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ingredient::INGREDIENT_COLUMNS;
use crate::repository::movement::{self, NewMovement};
use crate::stock::{begin_stock_transaction, ensure_user};
use grill_core::input::{IngredientInput, StockAdjustment};
use grill_core::{Ingredient, InventoryMovement, MovementKind, Quantity};

const CREATED_REASON: &str = "Ingredient created";
const EDIT_REASON: &str = "Manual stock edit";

#[derive(Debug, Clone)]
pub struct InventoryService {
    pool: SqlitePool,
}

impl InventoryService {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryService { pool }
    }

    /// Creates an ingredient and records its opening stock.
    ///
    /// `input` must already be validated. `actor` is the staff user
    /// recorded on the movement.
    pub async fn create_ingredient(&self, input: IngredientInput, actor: Option<&str>) -> DbResult<Ingredient> {
        let mut tx = begin_stock_transaction(&self.pool).await?;
        if let Some(user_id) = actor {
            ensure_user(&mut *tx, user_id).await?;
        }

        let now = Utc::now();
        let ingredient = Ingredient {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            unit: input.unit,
            stock: input.stock,
            minimum_stock: input.minimum_stock,
            package_price_cents: input.package_price_cents,
            package_size: input.package_size,
            supplier: input.supplier,
            storage_location: input.storage_location,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO ingredients (
                id, name, description, unit, stock, minimum_stock,
                package_price_cents, package_size, supplier, storage_location,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(&ingredient.description)
        .bind(ingredient.unit)
        .bind(ingredient.stock)
        .bind(ingredient.minimum_stock)
        .bind(ingredient.package_price_cents)
        .bind(ingredient.package_size)
        .bind(&ingredient.supplier)
        .bind(&ingredient.storage_location)
        .bind(ingredient.is_active)
        .bind(ingredient.created_at)
        .bind(ingredient.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("name", &ingredient.name))?;

        movement::record(
            &mut *tx,
            NewMovement {
                ingredient_id: &ingredient.id,
                kind: MovementKind::In,
                stock_before: Quantity::zero(),
                stock_after: ingredient.stock,
                reason: CREATED_REASON,
                user_id: actor,
                order_id: None,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            ingredient_id = %ingredient.id,
            name = %ingredient.name,
            stock = %ingredient.stock,
            "Ingredient created"
        );
        Ok(ingredient)
    }

    /// Replaces every field of an ingredient, stock included.
    pub async fn update_ingredient(
        &self,
        id: &str,
        input: IngredientInput,
        actor: Option<&str>,
    ) -> DbResult<Ingredient> {
        let mut tx = begin_stock_transaction(&self.pool).await?;
        if let Some(user_id) = actor {
            ensure_user(&mut *tx, user_id).await?;
        }

        let current = load(&mut *tx, id).await?;

        sqlx::query(
            r#"
            UPDATE ingredients SET
                name = ?2,
                description = ?3,
                unit = ?4,
                stock = ?5,
                minimum_stock = ?6,
                package_price_cents = ?7,
                package_size = ?8,
                supplier = ?9,
                storage_location = ?10,
                is_active = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.unit)
        .bind(input.stock)
        .bind(input.minimum_stock)
        .bind(input.package_price_cents)
        .bind(input.package_size)
        .bind(&input.supplier)
        .bind(&input.storage_location)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("name", &input.name))?;

        if input.stock != current.stock {
            movement::record(
                &mut *tx,
                NewMovement {
                    ingredient_id: id,
                    kind: MovementKind::Adjustment,
                    stock_before: current.stock,
                    stock_after: input.stock,
                    reason: EDIT_REASON,
                    user_id: actor,
                    order_id: None,
                },
            )
            .await?;
        }

        let updated = load(&mut *tx, id).await?;
        tx.commit().await?;

        info!(
            ingredient_id = %id,
            stock_before = %current.stock,
            stock_after = %updated.stock,
            "Ingredient updated"
        );
        Ok(updated)
    }

    /// Deletes an ingredient together with its recipe lines and movements.
    pub async fn delete_ingredient(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", id));
        }

        info!(ingredient_id = %id, "Ingredient deleted");
        Ok(())
    }

    /// Sets stock to an absolute value with a justification.
    ///
    /// Always records exactly one `adjustment` movement, including when the
    /// value does not change. Inactive ingredients are not found.
    pub async fn adjust(
        &self,
        id: &str,
        adjustment: StockAdjustment,
        actor: Option<&str>,
    ) -> DbResult<InventoryMovement> {
        let mut tx = begin_stock_transaction(&self.pool).await?;
        if let Some(user_id) = actor {
            ensure_user(&mut *tx, user_id).await?;
        }

        let current = load(&mut *tx, id).await?;
        if !current.is_active {
            return Err(DbError::not_found("Ingredient", id));
        }

        sqlx::query("UPDATE ingredients SET stock = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(adjustment.new_stock)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let recorded = movement::record(
            &mut *tx,
            NewMovement {
                ingredient_id: id,
                kind: MovementKind::Adjustment,
                stock_before: current.stock,
                stock_after: adjustment.new_stock,
                reason: &adjustment.reason,
                user_id: actor,
                order_id: None,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            ingredient_id = %id,
            name = %current.name,
            before = %current.stock,
            after = %adjustment.new_stock,
            reason = %adjustment.reason,
            "Stock adjusted"
        );
        Ok(recorded)
    }
}

async fn load(conn: &mut SqliteConnection, id: &str) -> DbResult<Ingredient> {
    let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
    sqlx::query_as::<_, Ingredient>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("Ingredient", id))
}
