//! Registration and login handlers.

use axum::{Json, extract::State, http::StatusCode};
use bazaar_core::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::db::users::LoginIdentifier;
use crate::extract::JsonBody;
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: UserId,
}

/// Login request body. Either `username` or `email` identifies the account.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// The username when one was sent, otherwise the email.
    fn identifier(&self) -> LoginIdentifier<'_> {
        if self.username.trim().is_empty() {
            LoginIdentifier::Email(&self.email)
        } else {
            LoginIdentifier::Username(&self.username)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// `POST /register`
#[instrument(skip_all, fields(username = %body.username))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let user = auth
        .register(Registration {
            username: &body.username,
            password: &body.password,
            email: &body.email,
            address: body.address.as_deref(),
        })
        .await
        .inspect_err(|e| warn!(error = %e, "Registration failed"))?;

    info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user_id: user.id,
        }),
    ))
}

/// `POST /login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let success = auth
        .login(body.identifier(), &body.password)
        .await
        .map_err(|e| {
            if matches!(e, AuthError::UserNotFound | AuthError::InvalidCredentials) {
                warn!(reason = %e, "Login rejected");
            }
            AppError::from(e)
        })?;

    info!(user_id = %success.user.id, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token: success.token.token,
        user_id: success.user.id,
        expires_at: success.token.expires_at,
    }))
}
