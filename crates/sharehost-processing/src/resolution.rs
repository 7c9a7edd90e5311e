//! Pixel dimensions for images (header decode) and videos (ffprobe).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::ImageReader;
use serde::Deserialize;
use sharehost_core::{MediaCategory, Resolution};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Not a video: {0}")]
    NotAVideo(String),

    #[error("Failed to read image dimensions: {0}")]
    Image(String),

    #[error("ffprobe failed: {0}")]
    Ffprobe(String),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Container-level video inspection.
#[async_trait]
pub trait VideoProbe: Send + Sync {
    async fn dimensions(&self, path: &Path) -> Result<Resolution, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

fn parse_probe_output(stdout: &[u8]) -> Result<Resolution, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::Ffprobe(format!("unparseable output: {}", e)))?;

    let stream = output.streams.first().ok_or(ProbeError::NoVideoStream)?;
    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(Resolution::new(width, height)),
        _ => Err(ProbeError::NoVideoStream),
    }
}

/// Runs `ffprobe` against the stored file.
#[derive(Debug, Clone)]
pub struct FfprobeVideoProbe {
    ffprobe_path: String,
}

impl FfprobeVideoProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[async_trait]
impl VideoProbe for FfprobeVideoProbe {
    #[tracing::instrument(skip_all, fields(
        process.executable.path = %self.ffprobe_path,
        path = %path.display()
    ))]
    async fn dimensions(&self, path: &Path) -> Result<Resolution, ProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProbeError::Ffprobe(format!(
                "exit status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        parse_probe_output(&output.stdout)
    }
}

/// Chooses the probing strategy from the upload's category.
#[derive(Clone)]
pub struct ResolutionProber {
    video: Arc<dyn VideoProbe>,
}

impl ResolutionProber {
    pub fn new(video: Arc<dyn VideoProbe>) -> Self {
        Self { video }
    }

    /// `{0, 0}` for audio and other files, without touching them.
    pub async fn probe(
        &self,
        path: &Path,
        category: MediaCategory,
    ) -> Result<Resolution, ProbeError> {
        match category {
            MediaCategory::Image | MediaCategory::Gif => image_dimensions(path).await,
            MediaCategory::Video => {
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                if mime.type_() != mime_guess::mime::VIDEO {
                    return Err(ProbeError::NotAVideo(mime.to_string()));
                }
                self.video.dimensions(path).await
            }
            MediaCategory::Audio | MediaCategory::Other => Ok(Resolution::UNKNOWN),
        }
    }
}

async fn image_dimensions(path: &Path) -> Result<Resolution, ProbeError> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Resolution, ProbeError> {
        let (width, height) = ImageReader::open(&path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| ProbeError::Image(e.to_string()))?;
        Ok(Resolution::new(width, height))
    })
    .await
    .map_err(|e| ProbeError::Image(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    struct FixedProbe(Resolution);

    #[async_trait]
    impl VideoProbe for FixedProbe {
        async fn dimensions(&self, _path: &Path) -> Result<Resolution, ProbeError> {
            Ok(self.0)
        }
    }

    fn prober() -> ResolutionProber {
        ResolutionProber::new(Arc::new(FixedProbe(Resolution::new(1920, 1080))))
    }

    #[tokio::test]
    async fn test_image_dimensions_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        RgbImage::from_pixel(800, 600, Rgb([1, 2, 3]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let resolution = prober().probe(&path, MediaCategory::Image).await.unwrap();
        assert_eq!(resolution, Resolution::new(800, 600));
    }

    #[tokio::test]
    async fn test_gif_is_probed_like_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        RgbImage::from_pixel(5, 7, Rgb([9, 9, 9]))
            .save_with_format(&path, ImageFormat::Gif)
            .unwrap();

        let resolution = prober().probe(&path, MediaCategory::Gif).await.unwrap();
        assert_eq!(resolution, Resolution::new(5, 7));
    }

    #[tokio::test]
    async fn test_video_uses_video_probe() {
        let resolution = prober()
            .probe(Path::new("clip.mp4"), MediaCategory::Video)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::new(1920, 1080));
    }

    #[tokio::test]
    async fn test_video_category_with_non_video_mime_is_rejected() {
        let result = prober()
            .probe(Path::new("clip.dat"), MediaCategory::Video)
            .await;
        assert!(matches!(result, Err(ProbeError::NotAVideo(_))));
    }

    #[tokio::test]
    async fn test_audio_and_other_are_zero() {
        let p = prober();
        assert_eq!(
            p.probe(Path::new("a.mp3"), MediaCategory::Audio).await.unwrap(),
            Resolution::UNKNOWN
        );
        assert_eq!(
            p.probe(Path::new("a.zip"), MediaCategory::Other).await.unwrap(),
            Resolution::UNKNOWN
        );
    }

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{"streams":[{"index":0,"codec_type":"video","width":1280,"height":720}]}"#;
        assert_eq!(
            parse_probe_output(json).unwrap(),
            Resolution::new(1280, 720)
        );
        assert!(matches!(
            parse_probe_output(br#"{"streams":[]}"#),
            Err(ProbeError::NoVideoStream)
        ));
        assert!(matches!(
            parse_probe_output(b"garbage"),
            Err(ProbeError::Ffprobe(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_ffprobe_binary_is_an_error() {
        let probe = FfprobeVideoProbe::new("/nonexistent/ffprobe");
        assert!(probe.dimensions(Path::new("clip.mp4")).await.is_err());
    }
}
