//! # Finished-Goods Stock Repository
//!
//! Optional per-product stock for items bought in finished (canned drinks,
//! packaged desserts). A product is tracked once it has a `product_stock`
//! row; checkout deducts tracked products only when finished-goods
//! tracking is switched on.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use grill_core::input::ProductStockInput;
use grill_core::{ProductStock, ProductStockEntry};

/// Appends a history row on the caller's transaction.
pub(crate) async fn record_history(
    conn: &mut SqliteConnection,
    product_id: &str,
    change: i64,
    stock_after: i64,
    reason: &str,
    order_id: Option<&str>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO product_stock_history (
            id, product_id, change, stock_after, reason, order_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(product_id)
    .bind(change)
    .bind(stock_after)
    .bind(reason)
    .bind(order_id)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn load(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Option<ProductStock>> {
    let stock = sqlx::query_as::<_, ProductStock>(
        "SELECT product_id, stock, minimum, updated_at FROM product_stock WHERE product_id = ?1",
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(stock)
}

#[derive(Debug, Clone)]
pub struct ProductStockRepository {
    pool: SqlitePool,
}

impl ProductStockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductStockRepository { pool }
    }

    /// Tracked stock of a product; `None` if it is not tracked.
    pub async fn get(&self, product_id: &str) -> DbResult<Option<ProductStock>> {
        let mut conn = self.pool.acquire().await?;
        load(&mut conn, product_id).await
    }

    /// Sets tracked stock and minimum, starting tracking if needed.
    pub async fn set(&self, product_id: &str, input: ProductStockInput) -> DbResult<ProductStock> {
        let mut tx = crate::stock::begin_stock_transaction(&self.pool).await?;

        let product: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if product.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let before = load(&mut *tx, product_id).await?.map_or(0, |s| s.stock);
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO product_stock (product_id, stock, minimum, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(product_id) DO UPDATE SET
                stock = excluded.stock,
                minimum = excluded.minimum,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product_id)
        .bind(input.stock)
        .bind(input.minimum)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        record_history(
            &mut *tx,
            product_id,
            input.stock - before,
            input.stock,
            "Manual stock edit",
            None,
        )
        .await?;

        tx.commit().await?;

        info!(product_id = %product_id, before, after = input.stock, "Product stock set");
        Ok(ProductStock {
            product_id: product_id.to_string(),
            stock: input.stock,
            minimum: input.minimum,
            updated_at: now,
        })
    }

    /// Stock history, newest first.
    pub async fn history(&self, product_id: &str) -> DbResult<Vec<ProductStockEntry>> {
        let entries = sqlx::query_as::<_, ProductStockEntry>(
            r#"
            SELECT id, product_id, change, stock_after, reason, order_id, created_at
            FROM product_stock_history
            WHERE product_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
