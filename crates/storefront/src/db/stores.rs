//! Store repository.

use bazaar_core::{StoreId, UserId};
use serde::Deserialize;
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::Store;
use crate::models::blob;

const STORE_COLUMNS: &str = "id, name, address, category, image, owner_id";

/// Fields for a new store. The owner comes from the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStore {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "blob")]
    pub image: Option<Vec<u8>>,
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StoreRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all stores in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores ORDER BY id");
        let stores = sqlx::query_as::<_, Store>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(stores)
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(store)
    }

    /// Find a store by its unique name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Store>, RepositoryError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE name = ?1");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        Ok(store)
    }

    /// Insert a store owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken and
    /// `RepositoryError::MissingReference` if the owner does not exist.
    pub async fn create(&self, owner: UserId, store: &NewStore) -> Result<Store, RepositoryError> {
        let sql = format!(
            "INSERT INTO stores (name, address, category, image, owner_id) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {STORE_COLUMNS}"
        );
        sqlx::query_as::<_, Store>(&sql)
            .bind(&store.name)
            .bind(&store.address)
            .bind(&store.category)
            .bind(store.image.as_deref())
            .bind(owner)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "store"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let pool = test_support::pool().await;
        let owner = test_support::user(&pool, "owner").await;
        test_support::store(&pool, owner, "Zed").await;
        test_support::store(&pool, owner, "Acme").await;

        let names: Vec<String> = StoreRepository::new(&pool)
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Zed", "Acme"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_and_missing_owner() {
        let pool = test_support::pool().await;
        let owner = test_support::user(&pool, "owner").await;
        let repo = StoreRepository::new(&pool);
        let store = NewStore {
            name: "Acme".to_owned(),
            address: "1 Road".to_owned(),
            category: "tools".to_owned(),
            image: Some(vec![1, 2, 3]),
        };

        let created = repo.create(owner, &store).await.expect("insert");
        assert_eq!(created.image.as_deref(), Some(&[1_u8, 2, 3][..]));

        assert!(matches!(
            repo.create(owner, &store).await,
            Err(RepositoryError::Conflict(_))
        ));

        let orphan = NewStore {
            name: "Orphan".to_owned(),
            ..store
        };
        assert!(matches!(
            repo.create(UserId::new(999), &orphan).await,
            Err(RepositoryError::MissingReference(_))
        ));
    }
}
