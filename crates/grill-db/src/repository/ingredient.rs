//! # Ingredient Repository
//!
//! Read side of the inventory ledger. Every write that touches `stock`
//! goes through [`InventoryService`](crate::service::InventoryService) so it
//! takes the stock lock and leaves a movement behind.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use grill_core::Ingredient;

pub(crate) const INGREDIENT_COLUMNS: &str = "id, name, description, unit, stock, minimum_stock, \
     package_price_cents, package_size, supplier, storage_location, is_active, \
     created_at, updated_at";

/// Inventory dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub ingredient_count: usize,
    /// Ingredients that are low or depleted.
    pub restock_count: usize,
    /// Σ stock × cost per unit, in cents.
    pub total_value_cents: i64,
}

#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// Lists ingredients by name. Inactive ones only when asked for.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Ingredient>> {
        let sql = format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients
             WHERE is_active = 1 OR ?1
             ORDER BY name COLLATE NOCASE"
        );
        let ingredients = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = ingredients.len(), "Listed ingredients");
        Ok(ingredients)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Ingredient>> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
        let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ingredient)
    }

    pub async fn require(&self, id: &str) -> DbResult<Ingredient> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Ingredient", id))
    }

    /// Ingredients at or below their minimum, most urgent first.
    pub async fn needing_restock(&self) -> DbResult<Vec<Ingredient>> {
        let mut low: Vec<Ingredient> = self
            .list(false)
            .await?
            .into_iter()
            .filter(Ingredient::needs_restock)
            .collect();
        low.sort_by_key(|i| i.stock - i.minimum_stock);
        Ok(low)
    }

    /// Counts and stock value over active ingredients.
    pub async fn summary(&self) -> DbResult<InventorySummary> {
        let ingredients = self.list(false).await?;

        let summary = InventorySummary {
            ingredient_count: ingredients.len(),
            restock_count: ingredients.iter().filter(|i| i.needs_restock()).count(),
            total_value_cents: Ingredient::total_stock_value(&ingredients).cents(),
        };

        debug!(?summary, "Computed inventory summary");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_list_hides_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        create_ingredient(&db, "Bun", "10", "2").await;
        let mut input = ingredient_input("Truffle", "1", "0");
        input.is_active = false;
        db.inventory().create_ingredient(input, None).await.unwrap();

        assert_eq!(db.ingredients().list(false).await.unwrap().len(), 1);
        assert_eq!(db.ingredients().list(true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_summary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // 48 buns at $0.50 = $24.00, normal
        create_ingredient_priced(&db, "Bun", "48", 1200, "24").await;
        // 1.5 kg beef at $12.00/kg = $18.00, low (minimum 2)
        let beef = create_ingredient_priced(&db, "Beef", "1.5", 2400, "2").await;
        sqlx::query("UPDATE ingredients SET minimum_stock = 200 WHERE id = ?1")
            .bind(&beef.id)
            .execute(db.pool())
            .await
            .unwrap();
        // depleted
        create_ingredient(&db, "Lettuce", "0", "1").await;

        let summary = db.ingredients().summary().await.unwrap();
        assert_eq!(summary.ingredient_count, 3);
        assert_eq!(summary.restock_count, 2);
        assert_eq!(summary.total_value_cents, 2400 + 1800);

        let low = db.ingredients().needing_restock().await.unwrap();
        let names: Vec<&str> = low.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Lettuce", "Beef"]);
    }

    #[tokio::test]
    async fn test_require_unknown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(matches!(
            db.ingredients().require("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
