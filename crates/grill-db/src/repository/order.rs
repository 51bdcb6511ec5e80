//! # Order Repository
//!
//! Reading orders and moving them through their lifecycle. Orders are
//! only ever created by [`CheckoutService`](crate::service::CheckoutService).
//!
//! ## Status Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PUT /staff/orders/{id}/status  { "status": "ready" }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load current status ──► OrderStatus::transition(current, next)         │
//! │       │                      │                                          │
//! │       │                      └── invalid → CoreError::InvalidStatus...  │
//! │       ▼                                                                 │
//! │  UPDATE ... WHERE id = ? AND status = current                           │
//! │       │                                                                 │
//! │       └── 0 rows: someone else moved it first → Conflict                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelling does not put ingredients back on the shelf.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use grill_core::invoice::Invoice;
use grill_core::{Order, OrderLine, OrderStatus, OrderWithLines, User};

pub(crate) const ORDER_COLUMNS: &str = "id, order_number, user_id, status, delivery_type, \
     payment_method, delivery_address, notes, promotion_id, promotion_code, discount_cents, \
     total_cents, created_at, updated_at";

/// Order lines in the order they were placed.
pub(crate) async fn load_lines(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderLine>> {
    let lines = sqlx::query_as::<_, OrderLine>(
        r#"
        SELECT id, order_id, product_id, name_snapshot, unit_price_cents,
               quantity, line_total_cents, created_at
        FROM order_lines
        WHERE order_id = ?1
        ORDER BY position
        "#,
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;

    Ok(lines)
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// A customer's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY order_number DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(user_id = %user_id, count = orders.len(), "Listed orders for user");
        Ok(orders)
    }

    /// Every order, optionally in one status, newest first.
    pub async fn list_all(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY order_number DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = orders.len(), ?status, "Listed orders");
        Ok(orders)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// An order with its lines, any owner.
    pub async fn get_with_lines(&self, id: &str) -> DbResult<OrderWithLines> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let mut conn = self.pool.acquire().await?;
        let lines = load_lines(&mut conn, &order.id).await?;
        Ok(OrderWithLines { order, lines })
    }

    /// An order with its lines, only if `user_id` placed it. Someone
    /// else's order is reported as not found.
    pub async fn get_for_user(&self, id: &str, user_id: &str) -> DbResult<OrderWithLines> {
        let found = self.get_with_lines(id).await?;
        if found.order.user_id != user_id {
            return Err(DbError::not_found("Order", id));
        }
        Ok(found)
    }

    /// Moves an order to `next` if the status machine allows it.
    pub async fn update_status(&self, id: &str, next: OrderStatus) -> DbResult<Order> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let next = order.status.transition(id, next)?;

        let result = sqlx::query(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        )
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(order.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::Conflict);
        }

        info!(order_id = %id, from = %order.status, to = %next, "Order status updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// The invoice document for one of the caller's orders.
    pub async fn invoice(&self, id: &str, user_id: &str) -> DbResult<Invoice> {
        let OrderWithLines { order, lines } = self.get_for_user(id, user_id).await?;

        let customer = sqlx::query_as::<_, User>(
            "SELECT id, email, name, phone, address, is_staff, created_at FROM users WHERE id = ?1",
        )
        .bind(&order.user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("User", &order.user_id))?;

        Ok(Invoice::build(&order, &lines, &customer))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{Database, DbConfig, DbError};
    use grill_core::{CoreError, OrderStatus};

    #[tokio::test]
    async fn test_status_machine_is_enforced() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = create_user(&db, "ana@example.com").await;
        let burger = create_product(&db, "Classic Burger", 899).await;
        add_to_cart(&db, &user.id, &burger.id, 1).await;
        let order = checkout_pickup(&db, &user.id).await;

        let updated = db
            .orders()
            .update_status(&order.order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        let err = db
            .orders()
            .update_status(&order.order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));

        db.orders()
            .update_status(&order.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        let pending = db.orders().list_all(Some(OrderStatus::Pending)).await.unwrap();
        assert!(pending.is_empty());
        let cancelled = db.orders().list_all(Some(OrderStatus::Cancelled)).await.unwrap();
        assert_eq!(cancelled.len(), 1);
    }

    #[tokio::test]
    async fn test_orders_are_private() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ana = create_user(&db, "ana@example.com").await;
        let ben = create_user(&db, "ben@example.com").await;
        let burger = create_product(&db, "Classic Burger", 899).await;
        add_to_cart(&db, &ana.id, &burger.id, 2).await;
        let order = checkout_pickup(&db, &ana.id).await;

        let mine = db.orders().get_for_user(&order.order.id, &ana.id).await.unwrap();
        assert_eq!(mine.lines.len(), 1);
        assert_eq!(mine.lines[0].quantity, 2);

        assert!(matches!(
            db.orders().get_for_user(&order.order.id, &ben.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.orders().list_for_user(&ben.id).await.unwrap().is_empty());
        assert_eq!(db.orders().list_for_user(&ana.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invoice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = create_user(&db, "ana@example.com").await;
        let burger = create_product(&db, "Classic Burger", 899).await;
        let fries = create_product(&db, "Fries", 350).await;
        add_to_cart(&db, &user.id, &burger.id, 2).await;
        add_to_cart(&db, &user.id, &fries.id, 1).await;
        let order = checkout_pickup(&db, &user.id).await;

        let invoice = db.orders().invoice(&order.order.id, &user.id).await.unwrap();
        assert_eq!(invoice.header.order_number, order.order.order_number);
        assert_eq!(invoice.customer.email, "ana@example.com");
        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(invoice.lines[0].name, "Classic Burger");
        assert_eq!(invoice.lines[0].subtotal_cents, 1798);
        assert_eq!(invoice.total_cents, 2148);
        assert_eq!(invoice.total_display, "$21.48");
    }
}
