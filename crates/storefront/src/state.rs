//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::StorefrontConfig;
use crate::services::StoreCache;
use crate::services::auth::TokenIssuer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    tokens: TokenIssuer,
    stores: StoreCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `SQLite` connection pool with migrations applied
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                stores: StoreCache::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the session token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Get a reference to the store list cache.
    #[must_use]
    pub fn stores(&self) -> &StoreCache {
        &self.inner.stores
    }
}
