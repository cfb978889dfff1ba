//! Item image storage and retrieval.

use bazaar_core::{ImageId, ItemId, UserId};
use sqlx::SqlitePool;
use tracing::info;

use super::ServiceError;
use crate::db::images::ImageRepository;
use crate::db::items::ItemRepository;
use crate::db::stores::StoreRepository;

/// Content type used when the payload's format is not recognised.
pub const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// An image payload with the content type it should be served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

pub struct ImageService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ImageService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Every payload stored for an item, in upload order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NoImages` when the item has none.
    pub async fn item_images(&self, item_id: ItemId) -> Result<Vec<Vec<u8>>, ServiceError> {
        let images = ImageRepository::new(self.pool).list_for_item(item_id).await?;
        if images.is_empty() {
            return Err(ServiceError::NoImages(item_id));
        }
        Ok(images)
    }

    /// The first payload stored for an item.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NoImages` when the item has none.
    pub async fn item_image(&self, item_id: ItemId) -> Result<ImageBlob, ServiceError> {
        let bytes = ImageRepository::new(self.pool)
            .first_for_item(item_id)
            .await?
            .ok_or(ServiceError::NoImages(item_id))?;
        Ok(ImageBlob {
            content_type: sniff_content_type(&bytes),
            bytes,
        })
    }

    /// Attach an uploaded image to an item owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty payload,
    /// `ServiceError::ItemNotFound` for an unknown item and
    /// `ServiceError::Forbidden` when `caller` does not own the item's store.
    pub async fn upload(
        &self,
        caller: UserId,
        item_id: ItemId,
        bytes: &[u8],
    ) -> Result<ImageId, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("image body is empty".to_owned()));
        }

        let item = ItemRepository::new(self.pool)
            .get_by_id(item_id)
            .await?
            .ok_or(ServiceError::ItemNotFound(item_id))?;

        let store = StoreRepository::new(self.pool)
            .get_by_id(item.store_id)
            .await?
            .ok_or_else(|| ServiceError::StoreNotFound(item.store_id.to_string()))?;
        if store.owner_id != caller {
            return Err(ServiceError::Forbidden);
        }

        let id = ImageRepository::new(self.pool)
            .insert(item.store_id, item.id, bytes)
            .await?;
        info!(image_id = %id, item_id = %item.id, size = bytes.len(), "Image uploaded");
        Ok(id)
    }
}

/// Identify common image formats from their magic bytes.
#[must_use]
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

    if bytes.starts_with(PNG) {
        "image/png"
    } else if bytes.starts_with(JPEG) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(&b"WEBP"[..]) {
        "image/webp"
    } else {
        FALLBACK_CONTENT_TYPE
    }
}
