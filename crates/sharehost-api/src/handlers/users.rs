use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::files::DeleteResponse;
use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::services::file_lifecycle;
use crate::state::AppState;

pub async fn delete_own_account(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    file_lifecycle::delete_user(&state, &user.username).await?;
    Ok(DeleteResponse::ok("User deleted"))
}

pub async fn delete_account(
    user: AuthUser,
    Path(username): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    user.require_admin()?;
    tracing::info!(admin = %user.username, target = %username, "Admin user deletion");
    file_lifecycle::delete_user(&state, &username).await?;
    Ok(DeleteResponse::ok("User deleted"))
}
