//! Engagement events: clicks and logged searches.

use bazaar_core::{ClickId, ItemId, SearchId, StoreId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A user viewing or selecting an item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Click {
    pub id: ClickId,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub store_id: StoreId,
    pub time_of_click: DateTime<Utc>,
}

/// A logged store search (`searches`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Search {
    pub id: SearchId,
    pub user_id: UserId,
    pub search_query: String,
    pub store_id: Option<StoreId>,
    pub time_of_search: DateTime<Utc>,
}

/// A logged item search scoped to one store (`searches_items`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchItem {
    pub id: SearchId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub query: String,
    pub time_of_search: DateTime<Utc>,
}
