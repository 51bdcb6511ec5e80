//! # Catalog Handlers
//!
//! Menu, products, recipes, categories and finished-goods stock.
//!
//! ## Menu Flow
//! ```text
//! GET /api/menu?available_only=true
//!        │
//!        ▼
//! ProductRepository::menu(policy)
//!        │  every recipe joined with ingredient stock
//!        │  and reservations from all carts
//!        ▼
//! [{ ...product, available, availability: { kind, units }, limited_by }]
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use grill_core::input::{CategoryInput, ProductInput, ProductStockInput, RecipeLineInput};
use grill_core::{AvailabilityReport, Category, Product, ProductStock, ProductStockEntry, RecipeLine};
use grill_db::{MenuItem, ProductRecipe};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

// =============================================================================
// Menu
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    /// Hide products that cannot be ordered right now.
    #[serde(default)]
    pub available_only: bool,
}

pub async fn menu(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    debug!(available_only = query.available_only, "menu");
    let items = state
        .db
        .products()
        .menu(state.options.stock_policy, query.available_only)
        .await?;
    Ok(Json(items))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list(query.category_id.as_deref()).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().require(&id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let input = input.validate()?;
    let product = state.db.products().create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Json<Product>> {
    let input = input.validate()?;
    Ok(Json(state.db.products().update(&id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Units the kitchen can make right now, net of other carts.
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AvailabilityReport>> {
    let report = state
        .db
        .products()
        .availability(&id, state.options.stock_policy)
        .await?;
    Ok(Json(report))
}

// =============================================================================
// Recipes
// =============================================================================

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductRecipe>> {
    Ok(Json(state.db.recipes().list_for_product(&id).await?))
}

/// Appends lines to a recipe; all are added or none.
pub async fn add_recipe_lines(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(lines): ApiJson<Vec<RecipeLineInput>>,
) -> ApiResult<(StatusCode, Json<Vec<RecipeLine>>)> {
    if lines.is_empty() {
        return Err(ApiError::validation("At least one recipe line is required"));
    }
    let lines = lines
        .into_iter()
        .map(RecipeLineInput::validate)
        .collect::<Result<Vec<_>, _>>()?;

    let added = state.db.recipes().add_lines(&id, lines).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

pub async fn delete_recipe_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.recipes().remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let input = input.validate()?;
    let category = state.db.categories().create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Finished-Goods Stock
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ProductStockView {
    /// `None` while the product is not tracked.
    pub stock: Option<ProductStock>,
    pub history: Vec<ProductStockEntry>,
}

pub async fn get_product_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductStockView>> {
    state.db.products().require(&id).await?;
    let repo = state.db.product_stock();
    Ok(Json(ProductStockView {
        stock: repo.get(&id).await?,
        history: repo.history(&id).await?,
    }))
}

pub async fn set_product_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProductStockInput>,
) -> ApiResult<Json<ProductStock>> {
    if !state.options.track_finished_goods {
        return Err(ApiError::validation("Finished-goods tracking is disabled"));
    }
    let input = input.validate()?;
    Ok(Json(state.db.product_stock().set(&id, input).await?))
}
