//! Store and item types.

use bazaar_core::{ItemId, Price, StoreId, UserId};
use serde::Serialize;

use super::blob;

/// A seller owning a catalog of items.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: StoreId,
    /// Unique name, also used as the routing key in URLs.
    pub name: String,
    pub address: String,
    pub category: String,
    #[serde(skip_serializing_if = "blob::is_absent", serialize_with = "blob::serialize")]
    pub image: Option<Vec<u8>>,
    pub owner_id: UserId,
}

/// A purchasable product belonging to exactly one store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    /// Percentage discount, `0..=100`.
    pub discount: i64,
    pub description: String,
    pub category: Option<String>,
    #[serde(skip_serializing_if = "blob::is_absent", serialize_with = "blob::serialize")]
    pub image: Option<Vec<u8>>,
    pub store_id: StoreId,
}
