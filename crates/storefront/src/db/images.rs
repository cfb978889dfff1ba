//! Item image payloads.

use bazaar_core::{ImageId, ItemId, StoreId};
use sqlx::SqlitePool;

use super::RepositoryError;

/// Repository for the `images` table.
pub struct ImageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ImageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All image payloads attached to an item, in upload order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_item(&self, item_id: ItemId) -> Result<Vec<Vec<u8>>, RepositoryError> {
        let rows: Vec<(Vec<u8>,)> =
            sqlx::query_as("SELECT image FROM images WHERE item_id = ?1 ORDER BY id")
                .bind(item_id)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|(bytes,)| bytes).collect())
    }

    /// The first image uploaded for an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn first_for_item(&self, item_id: ItemId) -> Result<Option<Vec<u8>>, RepositoryError> {
        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT image FROM images WHERE item_id = ?1 ORDER BY id LIMIT 1")
                .bind(item_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(bytes,)| bytes))
    }

    /// Attach an image to an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the item or store does
    /// not exist.
    pub async fn insert(
        &self,
        store_id: StoreId,
        item_id: ItemId,
        image: &[u8],
    ) -> Result<ImageId, RepositoryError> {
        let result = sqlx::query("INSERT INTO images (image, store_id, item_id) VALUES (?1, ?2, ?3)")
            .bind(image)
            .bind(store_id)
            .bind(item_id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "image"))?;
        Ok(ImageId::new(result.last_insert_rowid()))
    }
}
