//! Configuration module
//!
//! Everything is read once from the environment (optionally seeded from a
//! `.env` file) into an immutable [`Config`] that is shared behind an `Arc`.

use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::models::{HexColor, MediaCategory};

const PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 100;
const PREVIEW_QUALITY: f32 = 50.0;
const PALETTE_COLOR_COUNT: usize = 256;
const PALETTE_QUALITY: usize = 3;
const DISCORD_SUCCESS_COLOR: u32 = 0x57f287;
const DISCORD_ERROR_COLOR: u32 = 0xed4245;

/// HTTP server, database and auth settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub base_url: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub max_file_size_bytes: usize,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub redirect_url: String,
}

/// Upload pipeline feature flags and tunables
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    pub image_formats: Vec<String>,
    pub video_formats: Vec<String>,
    pub audio_formats: Vec<String>,
    pub remove_metadata: bool,
    pub use_dominant_color: bool,
    pub dominant_color_static: HexColor,
    pub palette_color_count: usize,
    pub palette_quality: usize,
    pub preview_quality: f32,
    pub ffprobe_path: String,
    pub timezone: Tz,
}

/// Texts and colors used by the view page and oEmbed responses
#[derive(Clone, Debug)]
pub struct BrandingConfig {
    pub site_title: String,
    pub site_favicon: String,
    pub og_title: String,
    pub og_description: String,
    /// May contain `&dominantColor` to use the record's own color instead.
    pub theme_color: String,
    pub box_shadow_color: String,
    pub copyright_text: String,
    pub author_name: String,
    pub author_url: String,
    pub provider_name: String,
    pub provider_url: String,
}

/// Discord webhook settings. No URL means notifications are disabled.
#[derive(Clone, Debug)]
pub struct NotifierConfig {
    pub webhook_url: Option<String>,
    pub webhook_name: String,
    pub success_color: u32,
    pub error_color: u32,
}

#[derive(Clone, Debug)]
pub struct SharehostConfig {
    pub server: ServerConfig,
    pub processing: ProcessingConfig,
    pub branding: BrandingConfig,
    pub notifier: NotifierConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SharehostConfig>);

impl Config {
    pub fn new(inner: SharehostConfig) -> Self {
        Config(Box::new(inner))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config::new(SharehostConfig::from_env()?))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.0.validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.0.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server(&self) -> &ServerConfig {
        &self.0.server
    }

    pub fn processing(&self) -> &ProcessingConfig {
        &self.0.processing
    }

    pub fn branding(&self) -> &BrandingConfig {
        &self.0.branding
    }

    pub fn notifier(&self) -> &NotifierConfig {
        &self.0.notifier
    }

    pub fn base_url(&self) -> &str {
        &self.0.server.base_url
    }

    pub fn server_port(&self) -> u16 {
        self.0.server.port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.0.server.jwt_secret
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.0.server.upload_dir
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Comma separated extension list, normalized to lowercase without leading dots.
pub fn parse_format_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_discord_color(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| HexColor::parse(&v))
        .map(|c| c.to_u32())
        .unwrap_or(default)
}

impl SharehostConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => format!(
                "postgresql://{}:{}@{}:{}/{}",
                var_or("DATABASE_USER", "postgres"),
                var_or("DATABASE_PASSWORD", ""),
                var_or("DATABASE_HOST", "localhost"),
                var_or("DATABASE_PORT", "5432"),
                var_or("DATABASE_DATABASE", "sharehost"),
            ),
        };

        let max_file_size_mb = parse_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);

        let server = ServerConfig {
            port: parse_or("PORT", PORT),
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
            base_url: var_or("BASE_URL", "").trim_end_matches('/').to_string(),
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .or_else(|_| env::var("JWT_TOKEN"))
                .unwrap_or_default(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "uploads")),
            public_dir: PathBuf::from(var_or("PUBLIC_DIR", "public")),
            redirect_url: var_or("REDIRECT_URL", "/"),
        };

        let defaults = ProcessingConfig::default();
        let timezone = match env::var("TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("Invalid TIMEZONE '{}': {}", name, e))?,
            Err(_) => defaults.timezone,
        };
        let dominant_color_static = match env::var("DOMINANT_COLOR_STATIC") {
            Ok(raw) => HexColor::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("DOMINANT_COLOR_STATIC must be a #rrggbb color, got '{}'", raw)
            })?,
            Err(_) => defaults.dominant_color_static,
        };

        let processing = ProcessingConfig {
            image_formats: env::var("IMAGE_FORMATS")
                .map(|v| parse_format_list(&v))
                .unwrap_or(defaults.image_formats),
            video_formats: env::var("VIDEO_FORMATS")
                .map(|v| parse_format_list(&v))
                .unwrap_or(defaults.video_formats),
            audio_formats: env::var("AUDIO_FORMATS")
                .map(|v| parse_format_list(&v))
                .unwrap_or(defaults.audio_formats),
            remove_metadata: flag("REMOVE_METADATA"),
            use_dominant_color: flag("USE_DOMINANT_COLOR"),
            dominant_color_static,
            palette_color_count: parse_or("PALETTE_COLOR_COUNT", PALETTE_COLOR_COUNT),
            palette_quality: parse_or("PALETTE_QUALITY", PALETTE_QUALITY),
            preview_quality: parse_or("PREVIEW_QUALITY", PREVIEW_QUALITY),
            ffprobe_path: var_or("FFPROBE_PATH", &defaults.ffprobe_path),
            timezone,
        };

        let branding_defaults = BrandingConfig::default();
        let branding = BrandingConfig {
            site_title: var_or("SITE_TITLE", &branding_defaults.site_title),
            site_favicon: var_or("SITE_FAVICON", &branding_defaults.site_favicon),
            og_title: var_or("OG_TITLE", &branding_defaults.og_title),
            og_description: var_or("OG_DESCRIPTION", &branding_defaults.og_description),
            theme_color: var_or("THEME_COLOR", &branding_defaults.theme_color),
            box_shadow_color: var_or("BOX_SHADOW_COLOR", &branding_defaults.box_shadow_color),
            copyright_text: var_or("COPYRIGHT_TEXT", &branding_defaults.copyright_text),
            author_name: var_or("AUTHOR_NAME", &branding_defaults.author_name),
            author_url: var_or("AUTHOR_URL", &branding_defaults.author_url),
            provider_name: var_or("PROVIDER_NAME", &branding_defaults.provider_name),
            provider_url: var_or("PROVIDER_URL", &branding_defaults.provider_url),
        };

        let notifier = NotifierConfig {
            webhook_url: env::var("DISCORD_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            webhook_name: var_or("DISCORD_WEBHOOK_NAME", "sharehost"),
            success_color: parse_discord_color(
                "DISCORD_WEBHOOK_SUCCESS_COLOR",
                DISCORD_SUCCESS_COLOR,
            ),
            error_color: parse_discord_color("DISCORD_WEBHOOK_ERROR_COLOR", DISCORD_ERROR_COLOR),
        };

        Ok(SharehostConfig {
            server,
            processing,
            branding,
            notifier,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.base_url.is_empty() {
            return Err(anyhow::anyhow!("BASE_URL must be set"));
        }

        if self.server.jwt_secret.is_empty() {
            return Err(anyhow::anyhow!("JWT_SECRET must be set"));
        }

        let env = self.server.environment.to_lowercase();
        if (env == "production" || env == "prod") && self.server.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long in production"
            ));
        }

        if !self.server.database_url.starts_with("postgres://")
            && !self.server.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.processing.palette_quality == 0 || self.processing.palette_color_count < 2 {
            return Err(anyhow::anyhow!(
                "PALETTE_QUALITY must be >= 1 and PALETTE_COLOR_COUNT >= 2"
            ));
        }

        if !(0.0..=100.0).contains(&self.processing.preview_quality) {
            return Err(anyhow::anyhow!("PREVIEW_QUALITY must be between 0 and 100"));
        }

        Ok(())
    }
}

impl ProcessingConfig {
    pub fn classify(&self, file_name: &str) -> MediaCategory {
        MediaCategory::from_file_name(
            file_name,
            &self.image_formats,
            &self.video_formats,
            &self.audio_formats,
        )
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            image_formats: parse_format_list("png,jpg,jpeg,webp,bmp,tiff"),
            video_formats: parse_format_list("mp4,webm,mov,mkv"),
            audio_formats: parse_format_list("mp3,wav,ogg,flac,m4a"),
            remove_metadata: false,
            use_dominant_color: false,
            dominant_color_static: HexColor::white(),
            palette_color_count: PALETTE_COLOR_COUNT,
            palette_quality: PALETTE_QUALITY,
            preview_quality: PREVIEW_QUALITY,
            ffprobe_path: "ffprobe".to_string(),
            timezone: chrono_tz::Europe::Berlin,
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            site_title: "sharehost".to_string(),
            site_favicon: "/assets/file.png".to_string(),
            og_title: "sharehost".to_string(),
            og_description: "Shared with sharehost".to_string(),
            theme_color: "#5865f2".to_string(),
            box_shadow_color: "#5865f2".to_string(),
            copyright_text: String::new(),
            author_name: "sharehost".to_string(),
            author_url: String::new(),
            provider_name: "sharehost".to_string(),
            provider_url: String::new(),
        }
    }
}
