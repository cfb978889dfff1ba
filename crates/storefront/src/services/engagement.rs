//! Engagement service: clicks, searches and click statistics.
//!
//! Every recording path resolves the store name first and fails with
//! `StoreNotFound` when it does not exist; nothing is logged against an
//! unknown store.

use bazaar_core::{ItemId, UserId};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::{ServiceError, require};
use crate::db::RepositoryError;
use crate::db::engagement::EngagementRepository;
use crate::db::items::ItemRepository;
use crate::db::stores::StoreRepository;
use crate::models::{Click, Search, SearchItem, Store};

pub struct EngagementService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EngagementService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    async fn resolve_store(&self, name: &str) -> Result<Store, ServiceError> {
        StoreRepository::new(self.pool)
            .get_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::StoreNotFound(name.to_owned()))
    }

    /// Record a user clicking an item of a store.
    ///
    /// All three values arrive as raw request text.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` if a field is empty, an id is not an
    ///   integer, or the item belongs to another store
    /// - `ServiceError::StoreNotFound` / `ServiceError::ItemNotFound` /
    ///   `ServiceError::UserNotFound` for unknown references
    #[instrument(skip(self))]
    pub async fn record_click(
        &self,
        store_name: &str,
        user_id: &str,
        item_id: &str,
    ) -> Result<Click, ServiceError> {
        let store_name = require("store_name", store_name)?;
        let user_id = require("user_id", user_id)?;
        let item_id = require("item_id", item_id)?;

        let user_id = UserId::parse(user_id).map_err(|e| ServiceError::bad_id("user_id", &e))?;
        let item_id = ItemId::parse(item_id).map_err(|e| ServiceError::bad_id("item_id", &e))?;

        let store = self.resolve_store(store_name).await?;
        let item = ItemRepository::new(self.pool)
            .get_by_id(item_id)
            .await?
            .ok_or(ServiceError::ItemNotFound(item_id))?;
        if item.store_id != store.id {
            return Err(ServiceError::Validation(format!(
                "item {item_id} does not belong to store {store_name}"
            )));
        }

        let click = EngagementRepository::new(self.pool)
            .insert_click(user_id, item.id, store.id, Utc::now())
            .await
            .map_err(|e| missing_user(e, user_id))?;

        debug!(click_id = %click.id, "Click recorded");
        Ok(click)
    }

    /// Log a search against a store. The query defaults to the store name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for missing fields and
    /// `ServiceError::StoreNotFound` / `ServiceError::UserNotFound` for
    /// unknown references.
    #[instrument(skip(self))]
    pub async fn record_search(
        &self,
        user_id: &str,
        store_name: &str,
        query: Option<&str>,
    ) -> Result<Search, ServiceError> {
        let user_id = require("user_id", user_id)?;
        let store_name = require("store_name", store_name)?;
        let user_id = UserId::parse(user_id).map_err(|e| ServiceError::bad_id("user_id", &e))?;

        let store = self.resolve_store(store_name).await?;
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(store_name);

        EngagementRepository::new(self.pool)
            .insert_search(user_id, query, Some(store.id), Utc::now())
            .await
            .map_err(|e| missing_user(e, user_id))
    }

    /// Log an item search within a store. All fields are required.
    ///
    /// # Errors
    ///
    /// Same as [`Self::record_search`], with `query` also required.
    #[instrument(skip(self))]
    pub async fn record_search_item(
        &self,
        user_id: &str,
        store_name: &str,
        query: &str,
    ) -> Result<SearchItem, ServiceError> {
        let user_id = require("user_id", user_id)?;
        let store_name = require("store_name", store_name)?;
        let query = require("query", query)?;
        let user_id = UserId::parse(user_id).map_err(|e| ServiceError::bad_id("user_id", &e))?;

        let store = self.resolve_store(store_name).await?;

        EngagementRepository::new(self.pool)
            .insert_search_item(user_id, store.id, query, Utc::now())
            .await
            .map_err(|e| missing_user(e, user_id))
    }

    /// Clicks on the named store's items, oldest first; `[]` for an unknown store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn statistics(&self, store_name: &str) -> Result<Vec<Click>, ServiceError> {
        Ok(EngagementRepository::new(self.pool)
            .clicks_for_store_name(store_name)
            .await?)
    }
}

/// The only dangling reference left after store and item checks is the user.
fn missing_user(err: RepositoryError, user_id: UserId) -> ServiceError {
    match err {
        RepositoryError::MissingReference(_) => ServiceError::UserNotFound(user_id),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support;

    async fn click_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clicks")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_three_clicks_feed_statistics() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "shopper").await;
        let acme = test_support::store(&pool, user, "Acme").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 500).await;
        let engagement = EngagementService::new(&pool);

        let uid = user.to_string();
        let iid = widget.id.to_string();
        for _ in 0..3 {
            engagement.record_click("Acme", &uid, &iid).await.unwrap();
        }

        let clicks = engagement.statistics("Acme").await.unwrap();
        assert_eq!(clicks.len(), 3);
        assert!(clicks.iter().all(|c| c.item_id == widget.id && c.store_id == acme.id));
        assert!(clicks.windows(2).all(|w| w[0].id < w[1].id));

        assert!(engagement.statistics("Nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_missing_fields_insert_nothing() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "shopper").await;
        let acme = test_support::store(&pool, user, "Acme").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 1).await;
        let engagement = EngagementService::new(&pool);
        let uid = user.to_string();
        let iid = widget.id.to_string();

        for (store, user_id, item_id) in [
            ("Acme", "", iid.as_str()),
            ("Acme", uid.as_str(), ""),
            ("", uid.as_str(), iid.as_str()),
            ("Acme", "abc", iid.as_str()),
        ] {
            assert!(matches!(
                engagement.record_click(store, user_id, item_id).await,
                Err(ServiceError::Validation(_))
            ));
        }
        assert_eq!(click_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_click_reference_checks() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "shopper").await;
        let acme = test_support::store(&pool, user, "Acme").await;
        let other = test_support::store(&pool, user, "Other").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 1).await;
        let gadget = test_support::item(&pool, other.id, "Gadget", 1).await;
        let engagement = EngagementService::new(&pool);
        let uid = user.to_string();

        assert!(matches!(
            engagement.record_click("Nowhere", &uid, &widget.id.to_string()).await,
            Err(ServiceError::StoreNotFound(_))
        ));
        assert!(matches!(
            engagement.record_click("Acme", &uid, "999").await,
            Err(ServiceError::ItemNotFound(_))
        ));
        assert!(matches!(
            engagement.record_click("Acme", &uid, &gadget.id.to_string()).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            engagement.record_click("Acme", "999", &widget.id.to_string()).await,
            Err(ServiceError::UserNotFound(_))
        ));
        assert_eq!(click_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_searches_fail_closed_on_unknown_store() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "shopper").await;
        test_support::store(&pool, user, "Acme").await;
        let engagement = EngagementService::new(&pool);
        let uid = user.to_string();

        let search = engagement.record_search(&uid, "Acme", None).await.unwrap();
        assert_eq!(search.search_query, "Acme");
        let search = engagement
            .record_search(&uid, "Acme", Some("hammers"))
            .await
            .unwrap();
        assert_eq!(search.search_query, "hammers");

        assert!(matches!(
            engagement.record_search(&uid, "Nowhere", None).await,
            Err(ServiceError::StoreNotFound(_))
        ));
        assert!(matches!(
            engagement.record_search_item(&uid, "Nowhere", "x").await,
            Err(ServiceError::StoreNotFound(_))
        ));
        assert!(matches!(
            engagement.record_search_item(&uid, "Acme", " ").await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(
            engagement
                .record_search_item(&uid, "Acme", "widget")
                .await
                .unwrap()
                .query,
            "widget"
        );
    }
}
