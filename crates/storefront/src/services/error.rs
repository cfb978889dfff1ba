//! Errors shared by the catalog, engagement, image and order services.

use bazaar_core::{IdError, ItemId, UserId};
use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required field was missing, empty or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("store not found: {0}")]
    StoreNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("no images found for item {0}")]
    NoImages(ItemId),

    /// The caller does not own the store being modified.
    #[error("only the store owner may do this")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl ServiceError {
    /// A validation error for a malformed ID field.
    pub(crate) fn bad_id(field: &str, err: &IdError) -> Self {
        Self::Validation(format!("{field}: {err}"))
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}
