//! Catalog service: stores and the items they sell.

use std::sync::Arc;

use bazaar_core::UserId;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use super::{ServiceError, StoreCache, require};
use crate::db::items::{ItemRepository, NewItem};
use crate::db::stores::{NewStore, StoreRepository};
use crate::models::{Item, Store};

/// Largest accepted percentage discount.
const MAX_DISCOUNT: i64 = 100;

pub struct CatalogService<'a> {
    pool: &'a SqlitePool,
    cache: &'a StoreCache,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, cache: &'a StoreCache) -> Self {
        Self { pool, cache }
    }

    /// All stores in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store list cannot be loaded.
    pub async fn list_stores(&self) -> Result<Arc<Vec<Store>>, ServiceError> {
        Ok(self.cache.stores(self.pool).await?)
    }

    /// Resolve a store by its routing name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StoreNotFound` if no store has that name.
    pub async fn store(&self, name: &str) -> Result<Store, ServiceError> {
        StoreRepository::new(self.pool)
            .get_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::StoreNotFound(name.to_owned()))
    }

    /// Items sold by the named store. An empty catalog is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StoreNotFound` for an unknown store name.
    #[instrument(skip(self))]
    pub async fn list_items(&self, store_name: &str) -> Result<Vec<Item>, ServiceError> {
        let store = self.store(store_name).await?;
        Ok(ItemRepository::new(self.pool).list_by_store(store.id).await?)
    }

    /// Open a new store owned by `owner` and refresh the store list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the name is blank and
    /// `ServiceError::Conflict` if the name is already taken.
    pub async fn create_store(&self, owner: UserId, store: NewStore) -> Result<Store, ServiceError> {
        let store = NewStore {
            name: require("name", &store.name)?.to_owned(),
            ..store
        };

        let created = StoreRepository::new(self.pool)
            .create(owner, &store)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::MissingReference(_) => ServiceError::UserNotFound(owner),
                other => other.into(),
            })?;
        self.cache.invalidate().await;

        info!(store_id = %created.id, store = %created.name, owner = %owner, "Store created");
        Ok(created)
    }

    /// Add an item to a store. Only the store's owner may do this.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StoreNotFound`, `ServiceError::Forbidden` when
    /// `caller` does not own the store, or `ServiceError::Validation` for a
    /// blank name or an out-of-range discount.
    pub async fn create_item(
        &self,
        caller: UserId,
        store_name: &str,
        item: NewItem,
    ) -> Result<Item, ServiceError> {
        let store = self.store(store_name).await?;
        if store.owner_id != caller {
            return Err(ServiceError::Forbidden);
        }

        let name = require("name", &item.name)?.to_owned();
        if !(0..=MAX_DISCOUNT).contains(&item.discount) {
            return Err(ServiceError::Validation(format!(
                "discount must be between 0 and {MAX_DISCOUNT}"
            )));
        }

        let created = ItemRepository::new(self.pool)
            .create(store.id, &NewItem { name, ..item })
            .await?;

        info!(item_id = %created.id, store = %store.name, "Item created");
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::Price;

    use super::*;
    use crate::db::test_support;

    fn new_store(name: &str) -> NewStore {
        NewStore {
            name: name.to_owned(),
            address: "1 Road".to_owned(),
            category: "tools".to_owned(),
            image: None,
        }
    }

    fn widget(price: i64) -> NewItem {
        NewItem {
            name: "Widget".to_owned(),
            price: Price::new(price).unwrap(),
            discount: 0,
            description: "A widget".to_owned(),
            category: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_acme_widget_scenario() {
        let pool = test_support::pool().await;
        let cache = StoreCache::new();
        let catalog = CatalogService::new(&pool, &cache);
        let owner = test_support::user(&pool, "owner").await;

        let acme = catalog.create_store(owner, new_store("Acme")).await.unwrap();
        assert_eq!(acme.id.as_i64(), 1);
        catalog.create_item(owner, "Acme", widget(500)).await.unwrap();

        let items = catalog.list_items("Acme").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Widget");
        assert_eq!(items[0].price.amount(), 500);
    }

    #[tokio::test]
    async fn test_empty_store_and_unknown_store() {
        let pool = test_support::pool().await;
        let cache = StoreCache::new();
        let catalog = CatalogService::new(&pool, &cache);
        let owner = test_support::user(&pool, "owner").await;
        catalog.create_store(owner, new_store("Empty")).await.unwrap();

        assert!(catalog.list_items("Empty").await.unwrap().is_empty());
        assert!(matches!(
            catalog.list_items("Nowhere").await,
            Err(ServiceError::StoreNotFound(name)) if name == "Nowhere"
        ));
    }

    #[tokio::test]
    async fn test_create_store_refreshes_list() {
        let pool = test_support::pool().await;
        let cache = StoreCache::new();
        let catalog = CatalogService::new(&pool, &cache);
        let owner = test_support::user(&pool, "owner").await;

        assert!(catalog.list_stores().await.unwrap().is_empty());
        catalog.create_store(owner, new_store("Acme")).await.unwrap();
        assert_eq!(catalog.list_stores().await.unwrap().len(), 1);

        assert!(matches!(
            catalog.create_store(owner, new_store("Acme")).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            catalog.create_store(owner, new_store("  ")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_only_owner_adds_items() {
        let pool = test_support::pool().await;
        let cache = StoreCache::new();
        let catalog = CatalogService::new(&pool, &cache);
        let owner = test_support::user(&pool, "owner").await;
        let stranger = test_support::user(&pool, "stranger").await;
        catalog.create_store(owner, new_store("Acme")).await.unwrap();

        assert!(matches!(
            catalog.create_item(stranger, "Acme", widget(1)).await,
            Err(ServiceError::Forbidden)
        ));

        let mut discounted = widget(1);
        discounted.discount = 150;
        assert!(matches!(
            catalog.create_item(owner, "Acme", discounted).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
