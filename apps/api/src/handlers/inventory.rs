//! # Inventory Handlers
//!
//! Staff-facing ingredient administration. Every stock change goes through
//! [`InventoryService`](grill_db::InventoryService) so it takes the stock
//! lock and writes a movement.
//!
//! ```text
//! POST /api/ingredients               → movement `in`         "Ingredient created"
//! PUT  /api/ingredients/{id}          → movement `adjustment` "Manual stock edit"
//!                                       (only when stock changed)
//! POST /api/ingredients/{id}/adjust   → movement `adjustment` with the given reason
//!                                       (always, even with no change)
//! ```
//!
//! The acting user is taken from `x-user-id` when present.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use grill_core::input::{IngredientInput, StockAdjustment};
use grill_core::{Ingredient, InventoryMovement};
use grill_db::{InventorySummary, DEFAULT_HISTORY_LIMIT};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::AppState;

const MAX_HISTORY_LIMIT: i64 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IngredientQuery>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = state.db.ingredients().list(query.include_inactive).await?;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ingredient>> {
    Ok(Json(state.db.ingredients().require(&id).await?))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    actor: Option<CurrentUser>,
    ApiJson(input): ApiJson<IngredientInput>,
) -> ApiResult<(StatusCode, Json<Ingredient>)> {
    let input = input.validate()?;
    let ingredient = state
        .db
        .inventory()
        .create_ingredient(input, actor.as_ref().map(CurrentUser::id))
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Option<CurrentUser>,
    ApiJson(input): ApiJson<IngredientInput>,
) -> ApiResult<Json<Ingredient>> {
    let input = input.validate()?;
    let ingredient = state
        .db
        .inventory()
        .update_ingredient(&id, input, actor.as_ref().map(CurrentUser::id))
        .await?;
    Ok(Json(ingredient))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.inventory().delete_ingredient(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sets stock to an exact value with a reason.
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Option<CurrentUser>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> ApiResult<Json<InventoryMovement>> {
    let adjustment = adjustment.validate()?;
    let movement = state
        .db
        .inventory()
        .adjust(&id, adjustment, actor.as_ref().map(CurrentUser::id))
        .await?;
    Ok(Json(movement))
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<InventorySummary>> {
    Ok(Json(state.db.ingredients().summary().await?))
}

/// Low or depleted ingredients, most urgent first.
pub async fn restock(State(state): State<AppState>) -> ApiResult<Json<Vec<Ingredient>>> {
    Ok(Json(state.db.ingredients().needing_restock().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub ingredient_id: Option<String>,
    pub limit: Option<i64>,
}

/// Movement history, newest first.
pub async fn movements(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MovementQuery>,
) -> ApiResult<Json<Vec<InventoryMovement>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::from(grill_core::ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_HISTORY_LIMIT,
        }));
    }

    let movements = state
        .db
        .movements()
        .list(query.ingredient_id.as_deref(), limit)
        .await?;
    Ok(Json(movements))
}
