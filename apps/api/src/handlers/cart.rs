//! # Cart Handlers
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────┐                    │
//! │  │  Empty   │────►│ In Cart  │────►│    Order     │                    │
//! │  │  Cart    │     │ (reserves│     │  (stock      │                    │
//! │  └──────────┘     │  stock)  │     │   deducted)  │                    │
//! │       ▲           └──────────┘     └──────────────┘                    │
//! │       │                │                 ▲                              │
//! │       │           POST /items            │                              │
//! │       │           PUT  /items/{id}   POST /checkout                     │
//! │       │           DELETE /items/{id}     │                              │
//! │       │                │                 │                              │
//! │       └────────────────┴─── cart cleared ┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected add or update leaves the cart as it was. Every response
//! carries the whole cart so the client never recomputes totals.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use grill_core::cart::CartSummary;
use grill_core::input::{AddCartItem, SetCartQuantity};
use grill_core::order::CheckoutRequest;
use grill_core::OrderWithLines;
use tracing::debug;

use crate::error::ApiResult;
use crate::extract::{ApiJson, CurrentUser};
use crate::AppState;

pub async fn get_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<CartSummary>> {
    Ok(Json(state.db.carts().summary(user.id()).await?))
}

/// Adds units of a product, merging with an existing line.
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(item): ApiJson<AddCartItem>,
) -> ApiResult<Json<CartSummary>> {
    let item = item.validate()?;
    debug!(user_id = %user.id(), product_id = %item.product_id, quantity = item.quantity, "add_item");

    let cart = state
        .db
        .cart_service(state.options)
        .add_item(user.id(), item)
        .await?;
    Ok(Json(cart))
}

/// Replaces the quantity of a line already in the cart.
pub async fn set_quantity(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    ApiJson(body): ApiJson<SetCartQuantity>,
) -> ApiResult<Json<CartSummary>> {
    let body = body.validate()?;
    let cart = state
        .db
        .cart_service(state.options)
        .set_quantity(user.id(), &product_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

/// Removes a line. Removing a line that is not there is not an error.
pub async fn remove_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<CartSummary>> {
    let carts = state.db.carts();
    carts.remove(user.id(), &product_id).await?;
    Ok(Json(carts.summary(user.id()).await?))
}

/// Turns the cart into an order.
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderWithLines>)> {
    let details = request.validate()?;
    let order = state
        .db
        .checkout(state.options)
        .checkout(user.id(), details)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
