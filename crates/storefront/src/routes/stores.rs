//! Store and item handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::db::items::NewItem;
use crate::db::stores::NewStore;
use crate::error::Result;
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::models::{Item, Store};
use crate::services::CatalogService;
use crate::state::AppState;

/// `GET /stores`
pub async fn list_stores(State(state): State<AppState>) -> Result<Json<Arc<Vec<Store>>>> {
    let stores = CatalogService::new(state.pool(), state.stores())
        .list_stores()
        .await?;
    Ok(Json(stores))
}

/// `POST /stores`
pub async fn create_store(
    State(state): State<AppState>,
    RequireAuth(owner): RequireAuth,
    JsonBody(body): JsonBody<NewStore>,
) -> Result<(StatusCode, Json<Store>)> {
    let store = CatalogService::new(state.pool(), state.stores())
        .create_store(owner, body)
        .await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// `GET /store/{store_name}`
pub async fn list_items(
    State(state): State<AppState>,
    Path(store_name): Path<String>,
) -> Result<Json<Vec<Item>>> {
    let items = CatalogService::new(state.pool(), state.stores())
        .list_items(&store_name)
        .await?;
    Ok(Json(items))
}

/// `POST /store/{store_name}/items`
pub async fn create_item(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(store_name): Path<String>,
    JsonBody(body): JsonBody<NewItem>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = CatalogService::new(state.pool(), state.stores())
        .create_item(caller, &store_name, body)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}
