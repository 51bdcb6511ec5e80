//! # Promotion Repository
//!
//! Discount codes. Codes are unique regardless of case and stored
//! upper-case; deleting a promotion keeps the code on past orders.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use grill_core::input::PromotionInput;
use grill_core::Promotion;

const PROMOTION_COLUMNS: &str = "id, code, description, percent_off_bp, amount_off_cents, \
     starts_at, ends_at, is_active, created_at";

/// Looks a code up on an open connection, for checkout.
pub(crate) async fn find_by_code(conn: &mut SqliteConnection, code: &str) -> DbResult<Option<Promotion>> {
    let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions WHERE code = ?1");
    let promotion = sqlx::query_as::<_, Promotion>(&sql)
        .bind(code)
        .fetch_optional(conn)
        .await?;

    Ok(promotion)
}

#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Every promotion, latest start first.
    pub async fn list(&self) -> DbResult<Vec<Promotion>> {
        let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions ORDER BY starts_at DESC, code");
        let promotions = sqlx::query_as::<_, Promotion>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = promotions.len(), "Listed promotions");
        Ok(promotions)
    }

    pub async fn require(&self, id: &str) -> DbResult<Promotion> {
        let sql = format!("SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = ?1");
        sqlx::query_as::<_, Promotion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Promotion", id))
    }

    /// Creates a promotion. `input` must already be validated.
    pub async fn create(&self, input: PromotionInput) -> DbResult<Promotion> {
        let promotion = Promotion {
            id: Uuid::new_v4().to_string(),
            code: input.code,
            description: input.description,
            percent_off_bp: input.percent_off_bp,
            amount_off_cents: input.amount_off_cents,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            is_active: input.is_active,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, code, description, percent_off_bp, amount_off_cents,
                starts_at, ends_at, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.code)
        .bind(&promotion.description)
        .bind(promotion.percent_off_bp)
        .bind(promotion.amount_off_cents)
        .bind(promotion.starts_at)
        .bind(promotion.ends_at)
        .bind(promotion.is_active)
        .bind(promotion.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("code", &promotion.code))?;

        info!(promotion_id = %promotion.id, code = %promotion.code, "Promotion created");
        Ok(promotion)
    }

    /// Replaces every field. Orders already placed keep their discount.
    pub async fn update(&self, id: &str, input: PromotionInput) -> DbResult<Promotion> {
        let result = sqlx::query(
            r#"
            UPDATE promotions SET
                code = ?2,
                description = ?3,
                percent_off_bp = ?4,
                amount_off_cents = ?5,
                starts_at = ?6,
                ends_at = ?7,
                is_active = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.percent_off_bp)
        .bind(input.amount_off_cents)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("code", &input.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        info!(promotion_id = %id, code = %input.code, "Promotion updated");
        self.require(id).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        info!(promotion_id = %id, "Promotion deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_create_update_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = create_promotion(&db, "grill10", 1000, 0).await;
        assert_eq!(created.code, "GRILL10");

        let mut input = promotion_input("GRILL15", 1500, 0);
        input.is_active = false;
        let updated = db.promotions().update(&created.id, input).await.unwrap();
        assert_eq!(updated.percent_off_bp, 1500);
        assert!(!updated.is_active);

        let listed = db.promotions().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code, "GRILL15");

        db.promotions().delete(&created.id).await.unwrap();
        assert!(matches!(
            db.promotions().require(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_codes_are_unique_regardless_of_case() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        create_promotion(&db, "WELCOME", 0, 200).await;

        let err = db
            .promotions()
            .create(promotion_input("welcome", 0, 300))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "code"));
    }

    #[tokio::test]
    async fn test_update_unknown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .promotions()
            .update("missing", promotion_input("X1", 100, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
