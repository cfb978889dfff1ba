//! Click and search event logging.

use bazaar_core::{ItemId, StoreId, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::{Click, Search, SearchItem};

const CLICK_COLUMNS: &str = "id, user_id, item_id, store_id, time_of_click";

/// Repository for engagement events.
pub struct EngagementRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EngagementRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a click.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the user, item or store
    /// does not exist.
    pub async fn insert_click(
        &self,
        user_id: UserId,
        item_id: ItemId,
        store_id: StoreId,
        at: DateTime<Utc>,
    ) -> Result<Click, RepositoryError> {
        let sql = format!(
            "INSERT INTO clicks (user_id, item_id, store_id, time_of_click) VALUES (?1, ?2, ?3, ?4) RETURNING {CLICK_COLUMNS}"
        );
        sqlx::query_as::<_, Click>(&sql)
            .bind(user_id)
            .bind(item_id)
            .bind(store_id)
            .bind(at)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "click"))
    }

    /// All clicks on items of the named store, oldest first.
    ///
    /// Clicks are joined through their item, so the result is empty (not an
    /// error) for an unknown store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clicks_for_store_name(&self, store_name: &str) -> Result<Vec<Click>, RepositoryError> {
        let clicks = sqlx::query_as::<_, Click>(
            "SELECT clicks.id, clicks.user_id, clicks.item_id, clicks.store_id, clicks.time_of_click \
             FROM clicks \
             INNER JOIN items ON clicks.item_id = items.id \
             INNER JOIN stores ON items.store_id = stores.id \
             WHERE stores.name = ?1 \
             ORDER BY clicks.id",
        )
        .bind(store_name)
        .fetch_all(self.pool)
        .await?;
        Ok(clicks)
    }

    /// Log a store search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the user does not exist.
    pub async fn insert_search(
        &self,
        user_id: UserId,
        query: &str,
        store_id: Option<StoreId>,
        at: DateTime<Utc>,
    ) -> Result<Search, RepositoryError> {
        sqlx::query_as::<_, Search>(
            "INSERT INTO searches (user_id, search_query, store_id, time_of_search) VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, user_id, search_query, store_id, time_of_search",
        )
        .bind(user_id)
        .bind(query)
        .bind(store_id)
        .bind(at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "search"))
    }

    /// Log an item search within a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the user or store does
    /// not exist.
    pub async fn insert_search_item(
        &self,
        user_id: UserId,
        store_id: StoreId,
        query: &str,
        at: DateTime<Utc>,
    ) -> Result<SearchItem, RepositoryError> {
        sqlx::query_as::<_, SearchItem>(
            "INSERT INTO searches_items (user_id, store_id, query, time_of_search) VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, user_id, store_id, query, time_of_search",
        )
        .bind(user_id)
        .bind(store_id)
        .bind(query)
        .bind(at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "search"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_clicks_are_scoped_and_ordered() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "shopper").await;
        let acme = test_support::store(&pool, user, "Acme").await;
        let other = test_support::store(&pool, user, "Other").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 1).await;
        let gadget = test_support::item(&pool, other.id, "Gadget", 1).await;

        let repo = EngagementRepository::new(&pool);
        let now = Utc::now();
        let first = repo.insert_click(user, widget.id, acme.id, now).await.expect("click");
        repo.insert_click(user, gadget.id, other.id, now).await.expect("click");
        let second = repo.insert_click(user, widget.id, acme.id, now).await.expect("click");

        let clicks = repo.clicks_for_store_name("Acme").await.expect("query");
        let ids: Vec<_> = clicks.iter().map(|c| c.id).collect();
        assert_eq!(ids, [first.id, second.id]);

        assert!(repo.clicks_for_store_name("Nowhere").await.expect("query").is_empty());
    }

    #[tokio::test]
    async fn test_click_for_unknown_user_is_missing_reference() {
        let pool = test_support::pool().await;
        let owner = test_support::user(&pool, "owner").await;
        let acme = test_support::store(&pool, owner, "Acme").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 1).await;

        let err = EngagementRepository::new(&pool)
            .insert_click(UserId::new(404), widget.id, acme.id, Utc::now())
            .await
            .expect_err("unknown user");
        assert!(matches!(err, RepositoryError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_search_logging() {
        let pool = test_support::pool().await;
        let user = test_support::user(&pool, "shopper").await;
        let acme = test_support::store(&pool, user, "Acme").await;
        let repo = EngagementRepository::new(&pool);

        let search = repo
            .insert_search(user, "Acme", Some(acme.id), Utc::now())
            .await
            .expect("search");
        assert_eq!(search.search_query, "Acme");
        assert_eq!(search.store_id, Some(acme.id));

        let item_search = repo
            .insert_search_item(user, acme.id, "widget", Utc::now())
            .await
            .expect("search item");
        assert_eq!(item_search.query, "widget");
    }
}
