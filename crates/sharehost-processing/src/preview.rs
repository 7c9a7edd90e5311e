//! WebP preview derivatives.

use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preview task failed: {0}")]
    Task(String),
}

/// Re-encodes images as lossy WebP at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct PreviewGenerator {
    quality: f32,
}

impl PreviewGenerator {
    pub fn new(quality: f32) -> Self {
        Self { quality }
    }

    /// Write a WebP rendition of `source` to `dest`.
    ///
    /// Decoding and encoding are CPU bound and run on the blocking pool.
    #[tracing::instrument(skip_all, fields(source = %source.display()))]
    pub async fn generate(&self, source: &Path, dest: &Path) -> Result<(), PreviewError> {
        let quality = self.quality;
        let source: PathBuf = source.to_path_buf();
        let dest: PathBuf = dest.to_path_buf();
        let start = std::time::Instant::now();

        let written = tokio::task::spawn_blocking(move || encode_preview(&source, &dest, quality))
            .await
            .map_err(|e| PreviewError::Task(e.to_string()))??;

        tracing::debug!(
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Preview generated"
        );
        Ok(())
    }
}

fn encode_preview(source: &Path, dest: &Path, quality: f32) -> Result<usize, PreviewError> {
    let img = ImageReader::open(source)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| PreviewError::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height()).encode(quality);

    std::fs::write(dest, &*encoded)?;
    Ok(encoded.len())
}
