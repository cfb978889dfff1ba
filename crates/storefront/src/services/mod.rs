//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login and session tokens
//! - `catalog` - Stores and items, with a cached store list
//! - `engagement` - Click and search event recording, click statistics
//! - `images` - Item image storage and retrieval
//! - `orders` - Purchases placed by authenticated users
//!
//! Services borrow the pool for the duration of one request and are cheap
//! to construct in handlers.

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod engagement;
mod error;
pub mod images;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use cache::StoreCache;
pub use catalog::CatalogService;
pub use engagement::EngagementService;
pub use error::ServiceError;
pub use images::ImageService;
pub use orders::OrderService;

/// Reject blank required text fields.
pub(crate) fn require<'v>(field: &str, value: &'v str) -> Result<&'v str, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(value)
}
