use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sharehost_core::{AppError, UserStore};

use super::jwt::verify_token;
use super::models::AuthUser;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub users: Arc<dyn UserStore>,
}

/// Accepts both `Bearer <token>` and the bare token.
fn token_from_header(header: &str) -> &str {
    let header = header.trim();
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .unwrap_or(header)
}

pub async fn authenticate(auth: &AuthState, header: Option<&str>) -> Result<AuthUser, AppError> {
    let token = header
        .map(token_from_header)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let claims = verify_token(token, &auth.jwt_secret)?;

    let user = auth
        .users
        .find_by_username(&claims.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    // Only the token currently stored on the account is valid.
    if user.token.as_deref() != Some(token) {
        tracing::debug!(username = %user.username, "Token does not match stored token");
        return Err(AppError::Unauthorized("Invalid token".to_string()));
    }

    Ok(AuthUser {
        id: user.id,
        username: user.username,
        role: user.role,
    })
}

pub async fn auth_middleware(
    State(auth): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    match authenticate(&auth, header.as_deref()).await {
        Ok(user) => {
            tracing::debug!(username = %user.username, role = %user.role, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
