//! Session tokens: HS256-signed JWTs binding a user identity.

use core::fmt;

use bazaar_core::UserId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::models::User;

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username at issue time.
    pub sub: String,
    pub user_id: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with a shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user.username.clone(),
            user_id: user.id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenIssue)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` once `exp` has passed and
    /// `AuthError::TokenInvalid` for every other failure.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
