//! Authentication service.
//!
//! Password registration and login, plus the session tokens issued on login.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, IssuedToken, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use tracing::instrument;

use bazaar_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::{LoginIdentifier, UserRepository};
use crate::models::User;

/// Fields accepted by [`AuthService::register`].
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub username: &'r str,
    pub password: &'r str,
    pub email: &'r str,
    pub address: Option<&'r str>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub user: User,
    pub token: IssuedToken,
}

/// Authentication service.
///
/// Handles user registration, login and token verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, tokens: &'a TokenIssuer) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user with a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if the password is empty.
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` for malformed input.
    /// Returns `AuthError::DuplicateUsername` if the username is taken.
    #[instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        if registration.username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if registration.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if registration.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }

        let username = Username::parse(registration.username)?;
        let email = Email::parse(registration.email)?;
        let address = registration.address.map(str::trim).filter(|a| !a.is_empty());

        let password_hash = hash_password_blocking(registration.password.to_owned()).await?;

        let user = self
            .users
            .create(&username, &password_hash, &email, address)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateUsername,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Log in with a username or an email and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches `identifier`.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        identifier: LoginIdentifier<'_>,
        password: &str,
    ) -> Result<LoginSuccess, AuthError> {
        let identifier = identifier.trimmed();
        if identifier.as_str().is_empty() {
            return Err(AuthError::MissingField("username or email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let (user, password_hash) = self
            .users
            .get_password_hash(identifier)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password = password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|_| AuthError::HashingFailure)??;

        let token = self.tokens.issue(&user)?;
        Ok(LoginSuccess { user, token })
    }

    /// Verify a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::TokenInvalid`.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens.verify(token)
    }

    /// Load the account a verified token refers to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn current_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users.get_by_id(id).await?.ok_or(AuthError::UserNotFound)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::HashingFailure` if the primitive fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailure)
}

async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| AuthError::HashingFailure)?
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use secrecy::SecretString;

    use super::*;
    use crate::db::test_support;

    fn tokens() -> TokenIssuer {
        TokenIssuer::new(
            &SecretString::from("unit-test-signing-key-6b1f0c93d2a84e75".to_owned()),
            Duration::hours(24),
        )
    }

    const ALICE: Registration<'static> = Registration {
        username: "alice",
        password: "pw123",
        email: "a@x.com",
        address: None,
    };

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        let auth = AuthService::new(&pool, &tokens);

        let registered = auth.register(ALICE).await.unwrap();

        let first = auth.login(LoginIdentifier::Username("alice"), "pw123").await.unwrap();
        assert!(!first.token.token.is_empty());
        assert_eq!(first.user.id, registered.id);

        let second = auth.login(LoginIdentifier::Username("alice"), "pw123").await.unwrap();
        assert_eq!(second.user.id, first.user.id);

        let by_email = auth.login(LoginIdentifier::Email("a@x.com"), "pw123").await.unwrap();
        assert_eq!(by_email.user.id, registered.id);

        assert_eq!(auth.verify(&first.token.token).unwrap(), registered.id);
    }

    #[tokio::test]
    async fn test_username_equal_to_another_email_logs_into_its_own_account() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        let auth = AuthService::new(&pool, &tokens);

        let alice = auth.register(ALICE).await.unwrap();
        let bob = auth
            .register(Registration {
                username: "a@x.com",
                password: "bobpw",
                email: "b@x.com",
                address: None,
            })
            .await
            .unwrap();

        let as_bob = auth
            .login(LoginIdentifier::Username("a@x.com"), "bobpw")
            .await
            .unwrap();
        assert_eq!(as_bob.user.id, bob.id);

        let as_alice = auth
            .login(LoginIdentifier::Email("a@x.com"), "pw123")
            .await
            .unwrap();
        assert_eq!(as_alice.user.id, alice.id);

        assert!(matches!(
            auth.login(LoginIdentifier::Email("a@x.com"), "bobpw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_plaintext() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        AuthService::new(&pool, &tokens).register(ALICE).await.unwrap();

        let (stored,): (String,) = sqlx::query_as("SELECT password FROM users WHERE username = 'alice'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(stored, "pw123");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_username_never_overwrites() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        let auth = AuthService::new(&pool, &tokens);

        auth.register(ALICE).await.unwrap();
        let err = auth
            .register(Registration {
                password: "other",
                email: "b@x.com",
                ..ALICE
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));

        assert!(auth.login(LoginIdentifier::Username("alice"), "pw123").await.is_ok());
        assert!(matches!(
            auth.login(LoginIdentifier::Username("alice"), "other").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_single_character_mutations_fail() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        let auth = AuthService::new(&pool, &tokens);
        auth.register(ALICE).await.unwrap();

        for password in ["pw124", "Pw123", "pw12", "pw1234"] {
            assert!(
                matches!(
                    auth.login(LoginIdentifier::Username("alice"), password).await,
                    Err(AuthError::InvalidCredentials)
                ),
                "password {password:?} should be rejected"
            );
        }
        for username in ["alicf", "Alice", "alic", "alicee"] {
            assert!(
                matches!(
                    auth.login(LoginIdentifier::Username(username), "pw123").await,
                    Err(AuthError::UserNotFound)
                ),
                "username {username:?} should not match"
            );
        }
    }

    #[tokio::test]
    async fn test_register_validation() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        let auth = AuthService::new(&pool, &tokens);

        assert!(matches!(
            auth.register(Registration { username: " ", ..ALICE }).await,
            Err(AuthError::MissingField("username"))
        ));
        assert!(matches!(
            auth.register(Registration { password: "", ..ALICE }).await,
            Err(AuthError::MissingField("password"))
        ));
        assert!(matches!(
            auth.register(Registration { email: "not-an-email", ..ALICE }).await,
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user() {
        let pool = test_support::pool().await;
        let tokens = tokens();
        let auth = AuthService::new(&pool, &tokens);
        let user = auth
            .register(Registration {
                address: Some("1 Main St"),
                ..ALICE
            })
            .await
            .unwrap();

        let loaded = auth.current_user(user.id).await.unwrap();
        assert_eq!(loaded.address.as_deref(), Some("1 Main St"));
        assert!(matches!(
            auth.current_user(UserId::new(999)).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
