//! # Promotion Handlers
//!
//! Staff administration of discount codes. Customers apply a code with
//! `promo_code` on `POST /api/cart/checkout`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use grill_core::input::PromotionInput;
use grill_core::Promotion;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::AppState;

pub async fn list_promotions(State(state): State<AppState>) -> ApiResult<Json<Vec<Promotion>>> {
    Ok(Json(state.db.promotions().list().await?))
}

pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Promotion>> {
    Ok(Json(state.db.promotions().require(&id).await?))
}

pub async fn create_promotion(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PromotionInput>,
) -> ApiResult<(StatusCode, Json<Promotion>)> {
    let input = input.validate()?;
    let promotion = state.db.promotions().create(input).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

pub async fn update_promotion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<PromotionInput>,
) -> ApiResult<Json<Promotion>> {
    let input = input.validate()?;
    Ok(Json(state.db.promotions().update(&id, input).await?))
}

pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.promotions().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
