//! User domain types.

use bazaar_core::{Email, UserId};
use serde::Serialize;

/// A registered account. The password hash is never part of this type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    #[serde(rename = "user_id")]
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Contact address (`users.mail`).
    pub email: Email,
    /// Postal address, if given at registration.
    pub address: Option<String>,
}
