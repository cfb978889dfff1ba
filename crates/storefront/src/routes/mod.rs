//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database)
//!
//! # Auth (rate limited)
//! POST /register                    - Create an account
//! POST /login                       - Exchange credentials for a token
//!
//! # Catalog
//! GET  /stores                      - All stores
//! POST /stores                      - Open a store (bearer token)
//! GET  /store/{store_name}          - Items of a store
//! POST /store/{store_name}/items    - Add an item (store owner)
//!
//! # Engagement
//! POST /click                       - Record a click (query parameters)
//! POST /search                      - Log a store search
//! POST /searchItems                 - Log an item search
//! GET  /statistics/{store_name}     - Clicks on a store's items
//!
//! # Images
//! GET  /images/{item_id}            - All images of an item (base64)
//! GET  /item/{item_id}/image        - First image of an item (raw bytes)
//! POST /item/{item_id}/images       - Upload an image (store owner)
//!
//! # Account (bearer token)
//! GET  /me                          - The caller's profile
//! GET  /orders                      - The caller's orders
//! POST /orders                      - Place an order
//! ```

pub mod account;
pub mod auth;
pub mod engagement;
pub mod health;
pub mod images;
pub mod stores;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the credential routes, rate limited when `rate_limit` is set.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    if rate_limit {
        router.layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(stores::list_stores).post(stores::create_store))
        .route("/store/{store_name}", get(stores::list_items))
        .route("/store/{store_name}/items", post(stores::create_item))
}

/// Create the engagement routes router.
pub fn engagement_routes() -> Router<AppState> {
    Router::new()
        .route("/click", post(engagement::record_click))
        .route("/search", post(engagement::record_search))
        .route("/searchItems", post(engagement::record_search_item))
        .route("/statistics/{store_name}", get(engagement::statistics))
}

/// Create the image routes router.
pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/images/{item_id}", get(images::item_images))
        .route("/item/{item_id}/image", get(images::item_image))
        .route("/item/{item_id}/images", post(images::upload_image))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(account::me))
        .route("/orders", get(account::orders).post(account::place_order))
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes(rate_limit))
        .merge(catalog_routes())
        .merge(engagement_routes())
        .merge(image_routes())
        .merge(account_routes())
}
