//! Public pages for shared files: view page, oEmbed and download.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sharehost_core::{AppError, UploadRecord};
use tokio_util::io::ReaderStream;

use crate::error::HttpAppError;
use crate::pages::{not_found_page, ViewPage};
use crate::state::AppState;

/// The record for `stored_name`, provided its bytes are still on disk.
async fn locate(state: &AppState, stored_name: &str) -> Result<Option<UploadRecord>, AppError> {
    let Some(record) = state.records.find_by_name(stored_name).await? else {
        return Ok(None);
    };

    match state.storage.exists(&record.owner, &record.stored_name).await {
        Ok(true) => Ok(Some(record)),
        Ok(false) => {
            tracing::debug!(
                owner = %record.owner,
                file = %record.stored_name,
                "Record exists but bytes are missing"
            );
            Ok(None)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Invalid stored name");
            Ok(None)
        }
    }
}

fn not_found(state: &AppState) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(not_found_page(state.config.branding())),
    )
        .into_response()
}

pub async fn view_file(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let Some(record) = locate(&state, &filename).await? else {
        return Ok(not_found(&state));
    };

    let category = state.config.processing().classify(&record.stored_name);
    let has_preview = category.has_preview()
        && state
            .storage
            .preview_exists(&record.owner, &record.stored_name)
            .await
            .unwrap_or(false);

    let page = ViewPage {
        branding: state.config.branding(),
        base_url: state.config.base_url(),
        record: &record,
        category,
        file_url: state.storage.file_url(&record.owner, &record.stored_name),
        preview_url: has_preview
            .then(|| state.storage.preview_url(&record.owner, &record.stored_name)),
    };

    Ok(Html(page.render()).into_response())
}

#[derive(Debug, Serialize)]
pub struct OEmbedResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: &'static str,
    pub title: String,
    pub author_url: String,
    pub author_name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub provider_name: String,
    pub provider_url: String,
    pub html: String,
}

pub async fn oembed(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OEmbedResponse>, HttpAppError> {
    let record = locate(&state, &filename)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File not found: {}", filename)))?;

    let branding = state.config.branding();
    let category = state.config.processing().classify(&record.stored_name);
    let file_url = state.storage.file_url(&record.owner, &record.stored_name);
    let (width, height) = (record.resolution.width, record.resolution.height);

    Ok(Json(OEmbedResponse {
        kind: category.oembed_type(),
        version: "1.0",
        title: record.stored_name.clone(),
        author_url: branding.author_url.clone(),
        author_name: branding.author_name.clone(),
        url: format!(
            "{}/view/{}",
            state.config.base_url(),
            urlencoding::encode(&record.stored_name)
        ),
        width,
        height,
        provider_name: branding.provider_name.clone(),
        provider_url: branding.provider_url.clone(),
        html: format!(
            r#"<iframe src="{}" width="{}" height="{}" frameborder="0"></iframe>"#,
            file_url, width, height
        ),
    }))
}

pub async fn download_file(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let Some(record) = locate(&state, &filename).await? else {
        return Ok(not_found(&state));
    };

    let path = state
        .storage
        .file_path(&record.owner, &record.stored_name)?;
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(not_found(&state)),
        Err(e) => return Err(AppError::from(e).into()),
    };

    let size_bytes = file.metadata().await.map_err(AppError::from)?.len();
    tracing::debug!(owner = %record.owner, file = %record.stored_name, size_bytes, "Streaming download");

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.stored_name),
        )
        .header(header::CONTENT_LENGTH, size_bytes)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
