//! User profile handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use grill_core::input::NewUser;
use grill_core::User;

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentUser};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let input = input.validate()?;
    let user = state.db.users().create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<User>> {
    Ok(Json(state.db.users().require(user.id()).await?))
}
