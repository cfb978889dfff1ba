//! User repository for database operations.
//!
//! Queries use runtime-checked `sqlx::query_as` with positional binds.

use bazaar_core::{Email, UserId, Username};
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::User;

const USER_COLUMNS: &str = "id, username, mail AS email, address";

/// A user row together with its stored password hash.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

/// Which account column a login value is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginIdentifier<'a> {
    Username(&'a str),
    Email(&'a str),
}

impl<'a> LoginIdentifier<'a> {
    /// The raw value, whichever column it targets.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        match *self {
            Self::Username(s) | Self::Email(s) => s,
        }
    }

    /// The same identifier with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed(self) -> Self {
        match self {
            Self::Username(s) => Self::Username(s.trim()),
            Self::Email(s) => Self::Email(s.trim()),
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        email: &Email,
        address: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (username, password, mail, address) VALUES (?1, ?2, ?3, ?4) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username.as_str())
            .bind(password_hash)
            .bind(email)
            .bind(address)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "username"))
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user and their password hash by username or by email.
    ///
    /// Only the column named by `identifier` is searched. Emails are not
    /// unique, so an email lookup returns the oldest matching account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        identifier: LoginIdentifier<'_>,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let filter = match identifier {
            LoginIdentifier::Username(_) => "username = ?1",
            LoginIdentifier::Email(_) => "mail = ?1",
        };
        let sql = format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE {filter} ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserWithHash>(&sql)
            .bind(identifier.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn alice() -> (Username, Email) {
        (
            Username::parse("alice").expect("valid"),
            Email::parse("a@x.com").expect("valid"),
        )
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_either_identifier() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let (username, email) = alice();

        let user = repo
            .create(&username, "hash", &email, Some("1 Main St"))
            .await
            .expect("insert");
        assert_eq!(user.username, "alice");
        assert_eq!(user.address.as_deref(), Some("1 Main St"));

        let (by_name, hash) = repo
            .get_password_hash(LoginIdentifier::Username("alice"))
            .await
            .expect("query")
            .expect("row");
        assert_eq!(by_name.id, user.id);
        assert_eq!(hash, "hash");

        let (by_mail, _) = repo
            .get_password_hash(LoginIdentifier::Email("a@x.com"))
            .await
            .expect("query")
            .expect("row");
        assert_eq!(by_mail.id, user.id);

        assert!(
            repo.get_password_hash(LoginIdentifier::Username("bob"))
                .await
                .expect("query")
                .is_none()
        );
        assert!(
            repo.get_password_hash(LoginIdentifier::Username("a@x.com"))
                .await
                .expect("query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_username_shaped_like_email_only_matches_username_column() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let (username, email) = alice();
        let alice = repo.create(&username, "alice-hash", &email, None).await.expect("insert");

        let lookalike = Username::parse("a@x.com").expect("valid");
        let other_mail = Email::parse("b@x.com").expect("valid");
        let bob = repo
            .create(&lookalike, "bob-hash", &other_mail, None)
            .await
            .expect("insert");

        let (by_name, hash) = repo
            .get_password_hash(LoginIdentifier::Username("a@x.com"))
            .await
            .expect("query")
            .expect("row");
        assert_eq!(by_name.id, bob.id);
        assert_eq!(hash, "bob-hash");

        let (by_mail, hash) = repo
            .get_password_hash(LoginIdentifier::Email("a@x.com"))
            .await
            .expect("query")
            .expect("row");
        assert_eq!(by_mail.id, alice.id);
        assert_eq!(hash, "alice-hash");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let pool = test_support::pool().await;
        let repo = UserRepository::new(&pool);
        let (username, email) = alice();

        repo.create(&username, "first", &email, None).await.expect("insert");
        let err = repo
            .create(&username, "second", &email, None)
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (_, hash) = repo.get_password_hash(LoginIdentifier::Username("alice")).await.expect("query").expect("row");
        assert_eq!(hash, "first");
    }
}
