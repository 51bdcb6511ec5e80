//! # Product Repository
//!
//! Database operations for products, plus the read side of the
//! availability calculator (menu and per-product availability).
//!
//! ## Menu Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How the Menu is Built                                │
//! │                                                                         │
//! │  products ──────────────────────┐                                       │
//! │                                 ▼                                       │
//! │  recipe_lines ⋈ ingredients ──► StockedRequirement per product         │
//! │  (+ reservations from carts)    │   in recipe order                     │
//! │                                 ▼                                       │
//! │                  AvailabilityReport::build(product, reqs, policy)       │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  MenuItem { product, is_available, availability, limited_by }           │
//! │                                                                         │
//! │  Two queries total, however many products there are.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::stock::{load_all_requirements, load_requirements};
use grill_core::input::ProductInput;
use grill_core::{Availability, AvailabilityReport, Product, StockPolicy};

const PRODUCT_COLUMNS: &str = "id, category_id, name, description, price_cents, image_url, \
                               is_available, created_at, updated_at";

/// A product as listed on the menu.
///
/// `product.is_available` is the manual switch; `available` is the
/// effective flag after the stock policy.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    #[serde(flatten)]
    pub product: Product,
    pub available: bool,
    pub availability: Availability,
    pub limited_by: Option<String>,
}

impl MenuItem {
    fn new(product: Product, report: AvailabilityReport) -> Self {
        MenuItem {
            product,
            available: report.is_available,
            availability: report.availability,
            limited_by: report.limited_by,
        }
    }

    pub fn can_order(&self) -> bool {
        self.available && self.availability.allows(1)
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, optionally within one category.
    pub async fn list(&self, category_id: Option<&str>) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE (?1 IS NULL OR category_id = ?1)
             ORDER BY name COLLATE NOCASE"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Creates a product. `input` must already be validated.
    pub async fn create(&self, input: ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            category_id: input.category_id,
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            image_url: input.image_url,
            is_available: input.is_available,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category_id, name, description, price_cents, image_url,
                is_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image_url)
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Replaces every editable field of a product.
    pub async fn update(&self, id: &str, input: ProductInput) -> DbResult<Product> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                image_url = ?6,
                is_available = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(&input.image_url)
        .bind(input.is_available)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product updated");
        self.require(id).await
    }

    /// Deletes a product. Recipe lines, cart lines and tracked stock go
    /// with it; past order lines keep their snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Availability of one product, net of every open cart.
    pub async fn availability(&self, id: &str, policy: StockPolicy) -> DbResult<AvailabilityReport> {
        let product = self.require(id).await?;
        let mut conn = self.pool.acquire().await?;
        let requirements = load_requirements(&mut conn, id, None).await?;

        Ok(AvailabilityReport::build(&product, &requirements, policy))
    }

    /// Every product with its effective availability.
    ///
    /// With `only_orderable`, products that cannot go in a cart right now
    /// (switched off, blocked by policy, or zero units) are left out.
    pub async fn menu(&self, policy: StockPolicy, only_orderable: bool) -> DbResult<Vec<MenuItem>> {
        let products = self.list(None).await?;
        let mut conn = self.pool.acquire().await?;
        let mut requirements = load_all_requirements(&mut conn).await?;

        let items: Vec<MenuItem> = products
            .into_iter()
            .map(|product| {
                let reqs = requirements.remove(&product.id).unwrap_or_default();
                let report = AvailabilityReport::build(&product, &reqs, policy);
                MenuItem::new(product, report)
            })
            .filter(|item| !only_orderable || item.can_order())
            .collect();

        debug!(count = items.len(), policy = %policy, "Built menu");
        Ok(items)
    }
}

// =============================================================================
// Tests
// =============================================================================
