use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sharehost_core::{AppError, UserRole};

use crate::error::HttpAppError;

/// Authenticated caller, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

// Extracted from parts (not `Extension`) so it composes with `Multipart`.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Not authenticated".to_string())))
    }
}
