//! Bearer-token authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use bazaar_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Rejects with 401 when the header is missing or malformed, or the token
/// is expired or does not verify.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user_id): RequireAuth) -> String {
///     format!("Hello, user {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let user_id = state.tokens().verify(token)?;
        set_sentry_user(&user_id, None);

        Ok(Self(user_id))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
