//! Click, search and statistics handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::{JsonBody, text_or_number};
use crate::models::Click;
use crate::services::EngagementService;
use crate::state::AppState;

/// Confirmation body for recorded events.
#[derive(Debug, Serialize)]
pub struct Recorded {
    pub message: &'static str,
    pub id: i64,
}

/// Query parameters of `POST /click`.
#[derive(Debug, Deserialize)]
pub struct ClickParams {
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub item_id: String,
}

/// `POST /click?store_name=..&user_id=..&item_id=..`
pub async fn record_click(
    State(state): State<AppState>,
    Query(params): Query<ClickParams>,
) -> Result<Json<Recorded>> {
    let click = EngagementService::new(state.pool())
        .record_click(&params.store_name, &params.user_id, &params.item_id)
        .await?;
    Ok(Json(Recorded {
        message: "Click recorded successfully",
        id: click.id.as_i64(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub query: Option<String>,
}

/// `POST /search`
pub async fn record_search(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SearchRequest>,
) -> Result<Json<Recorded>> {
    let search = EngagementService::new(state.pool())
        .record_search(&body.user_id, &body.store_name, body.query.as_deref())
        .await?;
    Ok(Json(Recorded {
        message: "Search recorded successfully",
        id: search.id.as_i64(),
    }))
}

/// `POST /searchItems`
pub async fn record_search_item(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SearchRequest>,
) -> Result<Json<Recorded>> {
    let search = EngagementService::new(state.pool())
        .record_search_item(
            &body.user_id,
            &body.store_name,
            body.query.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(Recorded {
        message: "Search recorded successfully",
        id: search.id.as_i64(),
    }))
}

/// `GET /statistics/{store_name}`
pub async fn statistics(
    State(state): State<AppState>,
    Path(store_name): Path<String>,
) -> Result<Json<Vec<Click>>> {
    Ok(Json(
        EngagementService::new(state.pool())
            .statistics(&store_name)
            .await?,
    ))
}
