//! # Recipe Repository
//!
//! The bill of materials: which ingredients one unit of a product consumes.
//!
//! ```text
//!   Classic Burger
//!   ├── #1  Bun       1.00 unit   $0.50
//!   ├── #2  Beef      0.15 kg     $1.80
//!   └── #3  Cheddar   0.02 kg     $0.24
//!                     production  $2.54
//! ```
//!
//! Lines keep their insertion order in `position`; checkout and the
//! availability calculator both walk recipes in that order.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use grill_core::input::RecipeLineInput;
use grill_core::{Money, Quantity, RecipeLine, UnitOfMeasure};

/// A recipe line joined with its ingredient, priced.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecipeLineView {
    pub id: String,
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub unit: UnitOfMeasure,
    pub quantity_per_unit: Quantity,
    pub notes: Option<String>,
    pub position: i64,
    #[serde(skip)]
    package_price_cents: i64,
    #[serde(skip)]
    package_size: Quantity,
    #[sqlx(skip)]
    pub line_cost_cents: i64,
}

/// Every recipe line of a product plus what one unit costs to make.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecipe {
    pub product_id: String,
    pub lines: Vec<RecipeLineView>,
    pub production_cost_cents: i64,
}

#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RecipeRepository { pool }
    }

    /// Appends a line to a product's recipe.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown product or ingredient
    /// - `UniqueViolation` (`ingredient_id`) if the ingredient is already
    ///   in this recipe
    pub async fn add(&self, product_id: &str, input: RecipeLineInput) -> DbResult<RecipeLine> {
        let mut tx = self.pool.begin().await?;
        ensure_product(&mut *tx, product_id).await?;
        let line = insert_line(&mut *tx, product_id, input).await?;
        tx.commit().await?;

        info!(
            product_id = %line.product_id,
            ingredient_id = %line.ingredient_id,
            quantity = %line.quantity_per_unit,
            "Recipe line added"
        );
        Ok(line)
    }

    /// Appends several lines in order. If any line fails, none are added.
    pub async fn add_lines(
        &self,
        product_id: &str,
        inputs: Vec<RecipeLineInput>,
    ) -> DbResult<Vec<RecipeLine>> {
        let mut tx = self.pool.begin().await?;
        ensure_product(&mut *tx, product_id).await?;

        let mut lines = Vec::with_capacity(inputs.len());
        for input in inputs {
            lines.push(insert_line(&mut *tx, product_id, input).await?);
        }
        tx.commit().await?;

        info!(product_id = %product_id, lines = lines.len(), "Recipe lines added");
        Ok(lines)
    }

    /// The priced recipe of a product. Unknown products are `NotFound`;
    /// a product without lines has an empty recipe.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<ProductRecipe> {
        let product: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        if product.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let mut lines = sqlx::query_as::<_, RecipeLineView>(
            r#"
            SELECT r.id, r.ingredient_id, i.name AS ingredient_name, i.unit,
                   r.quantity_per_unit, r.notes, r.position,
                   i.package_price_cents, i.package_size
            FROM recipe_lines r
            JOIN ingredients i ON i.id = r.ingredient_id
            WHERE r.product_id = ?1
            ORDER BY r.position
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        for line in &mut lines {
            line.line_cost_cents = Money::from_cents(line.package_price_cents)
                .prorate(
                    line.quantity_per_unit.hundredths(),
                    line.package_size.hundredths(),
                )
                .cents();
        }
        let production_cost_cents = lines.iter().map(|l| l.line_cost_cents).sum();

        debug!(product_id = %product_id, lines = lines.len(), "Loaded recipe");
        Ok(ProductRecipe {
            product_id: product_id.to_string(),
            lines,
            production_cost_cents,
        })
    }

    /// Removes one recipe line.
    pub async fn remove(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM recipe_lines WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Recipe line", id));
        }

        info!(recipe_line_id = %id, "Recipe line removed");
        Ok(())
    }
}

async fn ensure_product(conn: &mut SqliteConnection, product_id: &str) -> DbResult<()> {
    let product: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    match product {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Product", product_id)),
    }
}

/// Inserts one line at the end of the recipe.
async fn insert_line(
    conn: &mut SqliteConnection,
    product_id: &str,
    input: RecipeLineInput,
) -> DbResult<RecipeLine> {
    let ingredient: Option<i64> = sqlx::query_scalar("SELECT 1 FROM ingredients WHERE id = ?1")
        .bind(&input.ingredient_id)
        .fetch_optional(&mut *conn)
        .await?;
    if ingredient.is_none() {
        return Err(DbError::not_found("Ingredient", &input.ingredient_id));
    }

    let position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), 0) + 1 FROM recipe_lines WHERE product_id = ?1",
    )
    .bind(product_id)
    .fetch_one(&mut *conn)
    .await?;

    let line = RecipeLine {
        id: Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        ingredient_id: input.ingredient_id,
        quantity_per_unit: input.quantity_per_unit,
        notes: input.notes,
        position,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO recipe_lines (
            id, product_id, ingredient_id, quantity_per_unit, notes, position, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&line.id)
    .bind(&line.product_id)
    .bind(&line.ingredient_id)
    .bind(line.quantity_per_unit)
    .bind(&line.notes)
    .bind(line.position)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::from(e).with_duplicate_value("ingredient_id", &line.ingredient_id))?;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{Database, DbConfig, DbError};
    use grill_core::input::RecipeLineInput;
    use grill_core::Quantity;

    #[tokio::test]
    async fn test_recipe_keeps_insertion_order_and_prices_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let burger = create_product(&db, "Classic Burger", 899).await;
        // $12.00 for 24 buns, $24.00 for 2 kg of beef
        let bun = create_ingredient_priced(&db, "Bun", "48", 1200, "24").await;
        let beef = create_ingredient_priced(&db, "Beef", "5", 2400, "2").await;

        add_recipe_line(&db, &burger.id, &beef.id, "0.15").await;
        add_recipe_line(&db, &burger.id, &bun.id, "1").await;

        let recipe = db.recipes().list_for_product(&burger.id).await.unwrap();
        let names: Vec<&str> = recipe.lines.iter().map(|l| l.ingredient_name.as_str()).collect();
        assert_eq!(names, vec!["Beef", "Bun"]);
        assert_eq!(recipe.lines[0].position, 1);
        assert_eq!(recipe.lines[1].position, 2);

        // 0.15 kg × $12.00/kg = $1.80; 1 bun = $0.50
        assert_eq!(recipe.lines[0].line_cost_cents, 180);
        assert_eq!(recipe.lines[1].line_cost_cents, 50);
        assert_eq!(recipe.production_cost_cents, 230);
    }

    #[tokio::test]
    async fn test_same_ingredient_twice_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let burger = create_product(&db, "Classic Burger", 899).await;
        let bun = create_ingredient(&db, "Bun", "10", "0").await;
        add_recipe_line(&db, &burger.id, &bun.id, "1").await;

        let err = db
            .recipes()
            .add(
                &burger.id,
                RecipeLineInput {
                    ingredient_id: bun.id.clone(),
                    quantity_per_unit: Quantity::from_whole(2),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "ingredient_id"));
    }

    #[tokio::test]
    async fn test_unknown_references() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let burger = create_product(&db, "Classic Burger", 899).await;

        let err = db
            .recipes()
            .add(
                &burger.id,
                RecipeLineInput {
                    ingredient_id: uuid::Uuid::new_v4().to_string(),
                    quantity_per_unit: Quantity::from_whole(1),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Ingredient"));

        assert!(matches!(
            db.recipes().list_for_product("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_line() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let burger = create_product(&db, "Classic Burger", 899).await;
        let bun = create_ingredient(&db, "Bun", "10", "0").await;
        let line = add_recipe_line(&db, &burger.id, &bun.id, "1").await;

        db.recipes().remove(&line.id).await.unwrap();
        let recipe = db.recipes().list_for_product(&burger.id).await.unwrap();
        assert!(recipe.lines.is_empty());
        assert_eq!(recipe.production_cost_cents, 0);

        assert!(matches!(
            db.recipes().remove(&line.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_lines_is_all_or_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let burger = create_product(&db, "Classic Burger", 899).await;
        let bun = create_ingredient(&db, "Bun", "10", "0").await;
        let beef = create_ingredient(&db, "Beef", "5", "0").await;

        let line = |ingredient_id: &str, qty: i64| RecipeLineInput {
            ingredient_id: ingredient_id.to_string(),
            quantity_per_unit: Quantity::from_whole(qty),
            notes: None,
        };

        let err = db
            .recipes()
            .add_lines(&burger.id, vec![line(&bun.id, 1), line("missing", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(db.recipes().list_for_product(&burger.id).await.unwrap().lines.is_empty());

        let lines = db
            .recipes()
            .add_lines(&burger.id, vec![line(&bun.id, 1), line(&beef.id, 2)])
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].position, 1);
        assert_eq!(lines[1].position, 2);
    }
}
