//! Order types.

use bazaar_core::{ItemId, OrderId, OrderStatus, StoreId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A purchase of one item by one user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub store_id: Option<StoreId>,
    pub item_id: ItemId,
    pub quantity: i64,
    pub time_of_purchase: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub status: OrderStatus,
}
