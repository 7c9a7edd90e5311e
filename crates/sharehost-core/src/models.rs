//! Domain models shared across crates.

use std::fmt;
use std::path::Path;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const BYTES_PER_MEGABYTE: u64 = 1_048_576;

/// Pixel dimensions of an upload. `{0, 0}` means "not applicable or unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const UNKNOWN: Resolution = Resolution {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Closed classification of an upload, resolved once from its extension.
///
/// GIF is its own category: it is rendered as-is, never gets a WebP preview,
/// and still has its resolution probed like any other image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Gif,
    Video,
    Audio,
    Other,
}

impl MediaCategory {
    /// Classify by extension against the configured lists.
    ///
    /// Matching is case-insensitive and ignores a leading dot in the list entries.
    pub fn from_file_name(
        file_name: &str,
        image_formats: &[String],
        video_formats: &[String],
        audio_formats: &[String],
    ) -> Self {
        let ext = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return MediaCategory::Other,
        };
        let listed = |formats: &[String]| formats.iter().any(|f| f == &ext);

        if ext == "gif" {
            MediaCategory::Gif
        } else if listed(image_formats) {
            MediaCategory::Image
        } else if listed(video_formats) {
            MediaCategory::Video
        } else if listed(audio_formats) {
            MediaCategory::Audio
        } else {
            MediaCategory::Other
        }
    }

    /// Whether a WebP preview derivative is generated for this category.
    pub fn has_preview(&self) -> bool {
        matches!(self, MediaCategory::Image)
    }

    /// Still or animated picture formats.
    pub fn is_picture(&self) -> bool {
        matches!(self, MediaCategory::Image | MediaCategory::Gif)
    }

    /// Value of the oEmbed `type` field.
    pub fn oembed_type(&self) -> &'static str {
        match self {
            MediaCategory::Image | MediaCategory::Gif => "image",
            MediaCategory::Video => "video",
            MediaCategory::Audio => "audio",
            MediaCategory::Other => "file",
        }
    }
}

/// A `#rrggbb` color. Always well-formed once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    /// Parse `rrggbb` or `#rrggbb` (any case). Output is lowercase with a leading `#`.
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(HexColor(format!("#{}", digits.to_ascii_lowercase())))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        HexColor(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    pub fn white() -> Self {
        HexColor("#ffffff".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer form used by webhook embeds.
    pub fn to_u32(&self) -> u32 {
        u32::from_str_radix(&self.0[1..], 16).unwrap_or(0)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `bytes / 1048576` rounded to three decimals, half away from zero.
pub fn size_in_megabytes(size_bytes: u64) -> Decimal {
    (Decimal::from(size_bytes) / Decimal::from(BYTES_PER_MEGABYTE))
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Persisted metadata for one upload. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRecord {
    pub owner: String,
    pub stored_name: String,
    pub created_at: String,
    pub size_bytes: u64,
    pub size_mb: Decimal,
    pub dominant_color: HexColor,
    pub resolution: Resolution,
}

/// URLs handed back to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLinks {
    pub file: String,
    pub view: String,
    pub preview: String,
    pub delete: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    /// Unknown role strings are treated as a regular user.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub token: Option<String>,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_by_extension() {
        let images = list(&["png", "jpg"]);
        let videos = list(&["mp4"]);
        let audio = list(&["mp3"]);

        let classify = |name: &str| MediaCategory::from_file_name(name, &images, &videos, &audio);

        assert_eq!(classify("a.png"), MediaCategory::Image);
        assert_eq!(classify("a.JPG"), MediaCategory::Image);
        assert_eq!(classify("a.gif"), MediaCategory::Gif);
        assert_eq!(classify("a.mp4"), MediaCategory::Video);
        assert_eq!(classify("a.mp3"), MediaCategory::Audio);
        assert_eq!(classify("a.zip"), MediaCategory::Other);
        assert_eq!(classify("noext"), MediaCategory::Other);
    }

    #[test]
    fn test_only_images_get_previews() {
        assert!(MediaCategory::Image.has_preview());
        assert!(!MediaCategory::Gif.has_preview());
        assert!(!MediaCategory::Video.has_preview());
        assert_eq!(MediaCategory::Gif.oembed_type(), "image");
        assert_eq!(MediaCategory::Other.oembed_type(), "file");
    }

    #[test]
    fn test_hex_color_parse() {
        assert_eq!(HexColor::parse("#A1B2C3").unwrap().as_str(), "#a1b2c3");
        assert_eq!(HexColor::parse("ffffff").unwrap().as_str(), "#ffffff");
        assert!(HexColor::parse("#fff").is_none());
        assert!(HexColor::parse("#gggggg").is_none());
        assert_eq!(HexColor::from_rgb(255, 0, 16).as_str(), "#ff0010");
        assert_eq!(HexColor::parse("#00ff00").unwrap().to_u32(), 0x00ff00);
    }

    #[test]
    fn test_size_in_megabytes_rounds_to_three_places() {
        assert_eq!(size_in_megabytes(500_000), Decimal::new(477, 3));
        assert_eq!(size_in_megabytes(1_048_576), Decimal::new(1000, 3));
        assert_eq!(size_in_megabytes(0), Decimal::ZERO);
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(Resolution::new(800, 600).to_string(), "800x600");
        assert!(!Resolution::UNKNOWN.is_known());
    }
}
