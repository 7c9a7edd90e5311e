//! Multipart helpers for the upload handler

use axum::extract::Multipart;
use sharehost_core::AppError;

/// A single uploaded file read from the `file` field.
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub file_name: String,
}

/// Read the one field named `file`; other fields are ignored.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        upload = Some(UploadedFile {
            data: data.to_vec(),
            file_name,
        });
    }

    upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
}
