//! Item repository.

use bazaar_core::{ItemId, Price, StoreId};
use serde::Deserialize;
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::Item;
use crate::models::blob;

const ITEM_COLUMNS: &str =
    "id, name, price, discount, description, category, images AS image, store_id";

/// Fields for a new catalog item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "blob")]
    pub image: Option<Vec<u8>>,
}

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored price is negative.
    pub async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
        sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(corruption_or_database)
    }

    /// List the items of one store in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_store(&self, store_id: StoreId) -> Result<Vec<Item>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE store_id = ?1 ORDER BY id");
        sqlx::query_as::<_, Item>(&sql)
            .bind(store_id)
            .fetch_all(self.pool)
            .await
            .map_err(corruption_or_database)
    }

    /// Insert an item into a store's catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the store does not exist.
    pub async fn create(&self, store_id: StoreId, item: &NewItem) -> Result<Item, RepositoryError> {
        let sql = format!(
            "INSERT INTO items (name, price, discount, description, category, images, store_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&sql)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.discount)
            .bind(&item.description)
            .bind(item.category.as_deref())
            .bind(item.image.as_deref())
            .bind(store_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "item"))
    }
}

fn corruption_or_database(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::ColumnDecode { index, source } => {
            RepositoryError::DataCorruption(format!("item column {index}: {source}"))
        }
        other => RepositoryError::Database(other),
    }
}
