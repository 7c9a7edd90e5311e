use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file: String,
    pub view: String,
    pub preview: String,
    pub delete: String,
}

/// Store the upload, run the synchronous pipeline steps and return the links.
/// Color, resolution, persistence and notification finish in the background.
#[tracing::instrument(skip_all, fields(owner = %user.username))]
pub async fn upload_file(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = extract_multipart_file(multipart).await?;

    let stored = state
        .storage
        .store(&user.username, &upload.file_name, &upload.data)
        .await?;

    tracing::info!(
        original_name = %upload.file_name,
        stored_name = %stored.stored_name,
        size_bytes = upload.data.len(),
        "Upload received"
    );

    let outcome = state.pipeline.process_upload(stored).await;
    let links = outcome.links;

    Ok(Json(UploadResponse {
        success: true,
        file: links.file,
        view: links.view,
        preview: links.preview,
        delete: links.delete,
    }))
}
