//! # Order Handlers
//!
//! Customers see only their own orders; someone else's order id answers
//! 404. Staff routes list every order and move orders through the kitchen:
//!
//! ```text
//! pending ──► preparing ──► ready ──► delivered
//!    │            │
//!    └────────────┴──► cancelled
//! ```
//!
//! Cancelling does not put ingredients back.

use axum::extract::{Path, State};
use axum::Json;
use grill_core::input::StatusUpdate;
use grill_core::invoice::Invoice;
use grill_core::{Order, OrderStatus, OrderWithLines};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::AppState;

pub async fn list_mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list_for_user(user.id()).await?))
}

pub async fn get_mine(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderWithLines>> {
    Ok(Json(state.db.orders().get_for_user(&id, user.id()).await?))
}

/// Data for the printable invoice.
pub async fn invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(state.db.orders().invoice(&id, user.id()).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct StaffOrderQuery {
    pub status: Option<OrderStatus>,
}

pub async fn list_all(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StaffOrderQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list_all(query.status).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> ApiResult<Json<Order>> {
    let order = state.db.orders().update_status(&id, update.status).await?;
    debug!(order_id = %order.id, status = %order.status, "update_status");
    Ok(Json(order))
}
