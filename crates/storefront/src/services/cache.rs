//! In-process cache of the store list.
//!
//! Entries are keyed by a generation counter. Creating a store bumps the
//! generation before clearing the cache, so a list loaded concurrently
//! with the write lands under a key nobody reads again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::RepositoryError;
use crate::db::stores::StoreRepository;
use crate::models::Store;

/// Shared, explicitly invalidated store list cache.
#[derive(Clone)]
pub struct StoreCache {
    inner: Arc<StoreCacheInner>,
}

struct StoreCacheInner {
    cache: Cache<u64, Arc<Vec<Store>>>,
    generation: AtomicU64,
}

impl StoreCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StoreCacheInner {
                cache,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The current store list, loading it from the database on a miss.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the list has to be loaded and the query fails.
    pub async fn stores(&self, pool: &SqlitePool) -> Result<Arc<Vec<Store>>, RepositoryError> {
        let generation = self.inner.generation.load(Ordering::Acquire);

        if let Some(stores) = self.inner.cache.get(&generation).await {
            debug!(generation, "Cache hit for store list");
            return Ok(stores);
        }

        let stores = Arc::new(StoreRepository::new(pool).list().await?);
        self.inner
            .cache
            .insert(generation, Arc::clone(&stores))
            .await;
        Ok(stores)
    }

    /// Drop the cached list after a store is created.
    pub async fn invalidate(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl Default for StoreCache {
    fn default() -> Self {
        Self::new()
    }
}
