//! Handlers for the authenticated user's own data.

use axum::{Json, extract::State, http::StatusCode};
use bazaar_core::ItemId;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::extract::{JsonBody, text_or_number};
use crate::middleware::RequireAuth;
use crate::models::{Order, User};
use crate::services::{AuthService, OrderService};
use crate::state::AppState;

/// `GET /me`
pub async fn me(State(state): State<AppState>, RequireAuth(user_id): RequireAuth) -> Result<Json<User>> {
    let user = AuthService::new(state.pool(), state.tokens())
        .current_user(user_id)
        .await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// `POST /orders`
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    JsonBody(body): JsonBody<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let item_id = ItemId::parse(&body.item_id)
        .map_err(|e| AppError::BadRequest(format!("item_id: {e}")))?;

    let order = OrderService::new(state.pool())
        .place(user_id, item_id, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders`
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderService::new(state.pool()).for_user(user_id).await?))
}
