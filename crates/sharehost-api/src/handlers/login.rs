use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sharehost_core::{AppError, UserRole};

use crate::auth::jwt::issue_token;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid username or password".to_string())
}

/// Verify the password and hand out the account's token, issuing one on first login.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpAppError> {
    let user = state
        .users
        .find_by_username(&request.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    let hash = user.password_hash.clone();
    let password = request.password;
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored password hash is not valid bcrypt");
            false
        });

    if !valid {
        tracing::debug!(username = %user.username, "Login rejected");
        return Err(invalid_credentials().into());
    }

    let token = match user.token.clone() {
        Some(token) => token,
        None => {
            let token = issue_token(&user, state.config.jwt_secret())?;
            state.users.set_token(&user.username, &token).await?;
            tracing::info!(username = %user.username, "Issued new token");
            token
        }
    };

    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}
