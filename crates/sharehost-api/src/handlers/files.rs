use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::services::file_lifecycle;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

pub async fn list_own_files(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileListResponse>, HttpAppError> {
    let files = state.storage.list(&user.username).await?;
    Ok(Json(FileListResponse { files }))
}

pub async fn list_user_files(
    user: AuthUser,
    Path(username): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileListResponse>, HttpAppError> {
    user.require_admin()?;
    let files = state.storage.list(&username).await?;
    Ok(Json(FileListResponse { files }))
}

pub async fn delete_own_file(
    user: AuthUser,
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    file_lifecycle::delete_file(&state, &user.username, &filename).await?;
    Ok(DeleteResponse::ok("File deleted"))
}

pub async fn delete_user_file(
    user: AuthUser,
    Path((username, filename)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    user.require_admin()?;
    tracing::info!(admin = %user.username, owner = %username, file = %filename, "Admin file deletion");
    file_lifecycle::delete_file(&state, &username, &filename).await?;
    Ok(DeleteResponse::ok("File deleted"))
}
