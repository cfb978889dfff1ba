//! Seed the marketplace database with demo data.
//!
//! Fixtures are YAML (see `crates/cli/fixtures/demo.yaml`, which is also the
//! built-in default). Seeding is re-runnable: users and stores that already
//! exist are reused, and a reused store keeps its items and orders as they
//! are. Random clicks are added on every run.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use bazaar_core::{Email, ItemId, OrderStatus, Price, StoreId, UserId, Username};
use bazaar_storefront::db::{
    self, RepositoryError,
    engagement::EngagementRepository,
    images::ImageRepository,
    items::{ItemRepository, NewItem},
    orders::{NewOrder, OrderRepository},
    stores::{NewStore, StoreRepository},
    users::{LoginIdentifier, UserRepository},
};
use bazaar_storefront::services::AuthError;
use bazaar_storefront::services::auth::hash_password;
use bazaar_storefront::services::orders::DELIVERY_DAYS;

const DEMO_FIXTURES: &str = include_str!("../../fixtures/demo.yaml");

/// Random clicks are spread over this many days before now.
const CLICK_WINDOW_DAYS: i64 = 30;

/// Errors from the seed command.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid fixture: {0}")]
    Invalid(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixtures: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A fixtures document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<UserFixture>,
    #[serde(default)]
    pub stores: Vec<StoreFixture>,
    #[serde(default)]
    pub orders: Vec<OrderFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserFixture {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreFixture {
    pub name: String,
    pub address: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Username of the owning account.
    pub owner: String,
    #[serde(default)]
    pub items: Vec<ItemFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemFixture {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Image file, relative to the fixtures file.
    #[serde(default)]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderFixture {
    pub user: String,
    pub store: String,
    pub item: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub status: OrderStatus,
}

fn default_category() -> String {
    "general".to_owned()
}

const fn default_quantity() -> i64 {
    1
}

impl Fixtures {
    /// The built-in demo data.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the embedded document does not parse.
    pub fn demo() -> Result<Self, SeedError> {
        Self::parse(DEMO_FIXTURES)
    }

    /// Parse a fixtures document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` for malformed YAML, unknown keys or a
    /// negative price.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// What a seed run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users_created: usize,
    pub users_reused: usize,
    pub stores_created: usize,
    pub stores_reused: usize,
    pub items: usize,
    pub images: usize,
    pub orders: usize,
    pub clicks: usize,
}

/// Load fixtures, open the database, apply migrations and seed.
///
/// # Errors
///
/// Returns an error if the fixtures cannot be loaded, the database cannot
/// be opened, or any insert fails.
pub async fn run(
    database_url: &str,
    file: Option<&Path>,
    clicks: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let (fixtures, base_dir) = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading fixtures from file");
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| SeedError::Io {
                    path: path.to_owned(),
                    source,
                })?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (Fixtures::parse(&content)?, base)
        }
        None => {
            info!("Using built-in demo fixtures");
            (Fixtures::demo()?, PathBuf::new())
        }
    };

    let pool = db::create_pool(database_url).await?;
    db::migrate(&pool).await?;

    let summary = seed(&pool, &fixtures, &base_dir, clicks).await?;

    info!("Seeding complete!");
    info!(
        created = summary.users_created,
        reused = summary.users_reused,
        "  Users"
    );
    info!(
        created = summary.stores_created,
        reused = summary.stores_reused,
        "  Stores"
    );
    info!(
        items = summary.items,
        images = summary.images,
        orders = summary.orders,
        clicks = summary.clicks,
        "  Rows inserted"
    );

    pool.close().await;
    Ok(())
}

/// Insert `fixtures` into `pool`, then record `clicks` random clicks by the
/// seeded users on the seeded stores' items.
///
/// # Errors
///
/// Returns `SeedError::Invalid` when a fixture references an unknown user,
/// store or item, or carries an invalid username or email.
pub async fn seed(
    pool: &SqlitePool,
    fixtures: &Fixtures,
    base_dir: &Path,
    clicks: u32,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();
    let users = UserRepository::new(pool);
    let stores = StoreRepository::new(pool);
    let items = ItemRepository::new(pool);

    let mut user_ids: HashMap<String, UserId> = HashMap::new();
    for fixture in &fixtures.users {
        let username = Username::parse(&fixture.username)
            .map_err(|e| SeedError::Invalid(format!("user '{}': {e}", fixture.username)))?;

        if let Some(id) = find_user(pool, username.as_str()).await? {
            summary.users_reused += 1;
            user_ids.insert(fixture.username.clone(), id);
            continue;
        }

        let email = Email::parse(&fixture.email)
            .map_err(|e| SeedError::Invalid(format!("user '{}': {e}", fixture.username)))?;
        let hash = hash_password(&fixture.password)?;
        let user = users
            .create(&username, &hash, &email, fixture.address.as_deref())
            .await?;
        info!(user_id = %user.id, username = %user.username, "Created user");
        summary.users_created += 1;
        user_ids.insert(fixture.username.clone(), user.id);
    }

    let mut created_stores: HashSet<&str> = HashSet::new();
    let mut item_ids: HashMap<(String, String), (StoreId, ItemId)> = HashMap::new();
    for fixture in &fixtures.stores {
        let store = if let Some(existing) = stores.get_by_name(&fixture.name).await? {
            summary.stores_reused += 1;
            existing
        } else {
            let owner = resolve_user(pool, &user_ids, &fixture.owner).await?;
            let store = stores
                .create(
                    owner,
                    &NewStore {
                        name: fixture.name.clone(),
                        address: fixture.address.clone(),
                        category: fixture.category.clone(),
                        image: None,
                    },
                )
                .await?;
            info!(store_id = %store.id, name = %store.name, "Created store");
            summary.stores_created += 1;
            created_stores.insert(fixture.name.as_str());

            for item in &fixture.items {
                let image = match &item.image {
                    Some(path) => Some(read_image(&base_dir.join(path)).await?),
                    None => None,
                };
                let created = items
                    .create(
                        store.id,
                        &NewItem {
                            name: item.name.clone(),
                            price: item.price,
                            discount: item.discount,
                            description: item.description.clone(),
                            category: item.category.clone(),
                            image: image.clone(),
                        },
                    )
                    .await?;
                summary.items += 1;

                if let Some(bytes) = image {
                    ImageRepository::new(pool)
                        .insert(store.id, created.id, &bytes)
                        .await?;
                    summary.images += 1;
                }
            }
            store
        };

        for item in items.list_by_store(store.id).await? {
            item_ids
                .entry((fixture.name.clone(), item.name))
                .or_insert((store.id, item.id));
        }
    }

    let now = Utc::now();
    let orders = OrderRepository::new(pool);
    for fixture in &fixtures.orders {
        if !created_stores.contains(fixture.store.as_str()) {
            continue;
        }
        let user_id = resolve_user(pool, &user_ids, &fixture.user).await?;
        let &(store_id, item_id) = item_ids
            .get(&(fixture.store.clone(), fixture.item.clone()))
            .ok_or_else(|| {
                SeedError::Invalid(format!(
                    "order references unknown item '{}' in store '{}'",
                    fixture.item, fixture.store
                ))
            })?;
        orders
            .create(&NewOrder {
                user_id,
                store_id,
                item_id,
                quantity: fixture.quantity,
                time_of_purchase: now,
                estimated_delivery: now + Duration::days(DELIVERY_DAYS),
                status: fixture.status.clone(),
            })
            .await?;
        summary.orders += 1;
    }

    summary.clicks = record_clicks(pool, &user_ids, &item_ids, clicks).await?;
    Ok(summary)
}

async fn record_clicks(
    pool: &SqlitePool,
    user_ids: &HashMap<String, UserId>,
    item_ids: &HashMap<(String, String), (StoreId, ItemId)>,
    count: u32,
) -> Result<usize, SeedError> {
    if count == 0 {
        return Ok(0);
    }
    let users: Vec<UserId> = user_ids.values().copied().collect();
    let targets: Vec<(StoreId, ItemId)> = item_ids.values().copied().collect();
    if users.is_empty() || targets.is_empty() {
        warn!(count, "No users or items to click on, skipping clicks");
        return Ok(0);
    }

    let now = Utc::now();
    let picks: Vec<_> = {
        let mut rng = rand::rng();
        (0..count)
            .filter_map(|_| {
                let user = *users.choose(&mut rng)?;
                let (store, item) = *targets.choose(&mut rng)?;
                let ago = Duration::minutes(rng.random_range(0..CLICK_WINDOW_DAYS * 24 * 60));
                Some((user, item, store, now - ago))
            })
            .collect()
    };

    let engagement = EngagementRepository::new(pool);
    for &(user, item, store, at) in &picks {
        engagement.insert_click(user, item, store, at).await?;
    }
    Ok(picks.len())
}

async fn find_user(pool: &SqlitePool, username: &str) -> Result<Option<UserId>, SeedError> {
    let found = UserRepository::new(pool)
        .get_password_hash(LoginIdentifier::Username(username))
        .await?;
    Ok(found.map(|(user, _)| user.id))
}

async fn resolve_user(
    pool: &SqlitePool,
    seeded: &HashMap<String, UserId>,
    username: &str,
) -> Result<UserId, SeedError> {
    if let Some(&id) = seeded.get(username) {
        return Ok(id);
    }
    find_user(pool, username)
        .await?
        .ok_or_else(|| SeedError::Invalid(format!("unknown user '{username}'")))
}

async fn read_image(path: &Path) -> Result<Vec<u8>, SeedError> {
    tokio::fs::read(path).await.map_err(|source| SeedError::Io {
        path: path.to_owned(),
        source,
    })
}
