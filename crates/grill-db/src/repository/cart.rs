//! # Cart Repository
//!
//! Read and remove operations on carts. Adding or changing a quantity
//! reserves stock, so those go through
//! [`CartService`](crate::service::CartService) instead.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use grill_core::cart::{CartLine, CartSummary};

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Cart lines in insertion order, priced at current product prices.
    pub async fn lines(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT c.product_id, p.name, p.price_cents AS unit_price_cents, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY c.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// The cart as shown to the customer.
    pub async fn summary(&self, user_id: &str) -> DbResult<CartSummary> {
        let summary = CartSummary::from_lines(self.lines(user_id).await?);
        debug!(user_id = %user_id, items = summary.item_count, "Loaded cart");
        Ok(summary)
    }

    /// Removes a product from the caller's cart. Removing something that
    /// is not there succeeds.
    pub async fn remove(&self, user_id: &str, product_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(user_id = %user_id, product_id = %product_id, "Cart item removed");
        }
        Ok(removed)
    }

    /// Empties the caller's cart.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!(user_id = %user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_summary_and_remove() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = create_user(&db, "ana@example.com").await;
        let burger = create_product(&db, "Classic Burger", 899).await;
        let fries = create_product(&db, "Fries", 350).await;

        add_to_cart(&db, &user.id, &fries.id, 1).await;
        add_to_cart(&db, &user.id, &burger.id, 2).await;

        let cart = db.carts().summary(&user.id).await.unwrap();
        let names: Vec<&str> = cart.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Fries", "Classic Burger"]);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.total_cents, 350 + 2 * 899);
        assert_eq!(cart.lines[1].line_total_cents, 1798);

        assert!(db.carts().remove(&user.id, &fries.id).await.unwrap());
        assert!(!db.carts().remove(&user.id, &fries.id).await.unwrap());
        assert_eq!(db.carts().summary(&user.id).await.unwrap().lines.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_only_touches_own_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ana = create_user(&db, "ana@example.com").await;
        let ben = create_user(&db, "ben@example.com").await;
        let burger = create_product(&db, "Classic Burger", 899).await;
        add_to_cart(&db, &ana.id, &burger.id, 1).await;

        assert!(!db.carts().remove(&ben.id, &burger.id).await.unwrap());
        assert_eq!(db.carts().summary(&ana.id).await.unwrap().item_count, 1);

        assert_eq!(db.carts().clear(&ana.id).await.unwrap(), 1);
        assert!(db.carts().summary(&ana.id).await.unwrap().is_empty());
    }
}
