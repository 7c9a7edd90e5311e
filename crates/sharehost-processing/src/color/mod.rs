//! Dominant color extraction.

mod palette;
mod vibrant;

use std::path::{Path, PathBuf};

use image::ImageReader;
use sharehost_core::HexColor;
use thiserror::Error;

pub use palette::{quantize, Swatch};
pub use vibrant::vibrant;

/// Formats the extractor decodes. Everything else is reported as white.
const RASTER_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/tiff",
    "image/bmp",
];

/// Pixels at or below this alpha are ignored.
const MIN_ALPHA: u8 = 125;
/// Near-white pixels are ignored so backgrounds don't dominate.
const WHITE_THRESHOLD: u8 = 250;

#[derive(Debug, Error)]
pub enum ColorError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Image has no vibrant color")]
    NoVibrantSwatch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Color extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ColorExtractor {
    color_count: usize,
    quality: usize,
}

impl ColorExtractor {
    /// `color_count` bounds the palette size, `quality` is the pixel sampling stride.
    pub fn new(color_count: usize, quality: usize) -> Self {
        Self {
            color_count: color_count.max(2),
            quality: quality.max(1),
        }
    }

    pub fn supports(path: &Path) -> bool {
        mime_guess::from_path(path)
            .first_raw()
            .is_some_and(|mime| RASTER_MIME_TYPES.contains(&mime))
    }

    /// Vibrant color of the image at `path`, or white for non-raster files.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub async fn extract(&self, path: &Path) -> Result<HexColor, ColorError> {
        if !Self::supports(path) {
            return Ok(HexColor::white());
        }

        let extractor = *self;
        let path: PathBuf = path.to_path_buf();
        let [r, g, b] = tokio::task::spawn_blocking(move || extractor.extract_blocking(&path))
            .await
            .map_err(|e| ColorError::Task(e.to_string()))??;

        Ok(HexColor::from_rgb(r, g, b))
    }

    fn extract_blocking(&self, path: &Path) -> Result<[u8; 3], ColorError> {
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| ColorError::Decode(e.to_string()))?
            .to_rgba8();

        let pixels: Vec<[u8; 3]> = img
            .pixels()
            .step_by(self.quality)
            .filter(|p| {
                let [r, g, b, a] = p.0;
                a >= MIN_ALPHA
                    && !(r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD)
            })
            .map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();

        let swatches = quantize(&pixels, self.color_count);
        vibrant(&swatches).ok_or(ColorError::NoVibrantSwatch)
    }
}
