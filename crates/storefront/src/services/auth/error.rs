//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid username.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] bazaar_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Username already registered.
    #[error("username already exists")]
    DuplicateUsername,

    /// The password hashing primitive failed.
    #[error("password hashing error")]
    HashingFailure,

    /// No account matches the login identifier.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password for an existing account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The bearer token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// The bearer token is malformed or its signature does not verify.
    #[error("invalid token")]
    TokenInvalid,

    /// Signing a token failed.
    #[error("token signing error: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
