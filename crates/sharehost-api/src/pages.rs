//! Server-rendered HTML for the view and not-found pages.

use sharehost_core::{BrandingConfig, MediaCategory, UploadRecord};

use crate::utils::html::escape;

const DOMINANT_COLOR_MARKER: &str = "&dominantColor";
pub const PLACEHOLDER_ICON: &str = "assets/file.png";

/// Everything the view page needs about one upload.
pub struct ViewPage<'a> {
    pub branding: &'a BrandingConfig,
    pub base_url: &'a str,
    pub record: &'a UploadRecord,
    pub category: MediaCategory,
    pub file_url: String,
    /// `None` when no preview exists on disk.
    pub preview_url: Option<String>,
}

fn with_hash(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{}", color)
    }
}

impl ViewPage<'_> {
    pub fn theme_color(&self) -> String {
        if self.branding.theme_color.contains(DOMINANT_COLOR_MARKER) {
            self.record.dominant_color.to_string()
        } else {
            self.branding.theme_color.clone()
        }
    }

    /// Still images glow in their own color, everything else in the branding color.
    pub fn shadow_color(&self) -> String {
        if self.category == MediaCategory::Image {
            self.record.dominant_color.to_string()
        } else {
            with_hash(&self.branding.box_shadow_color)
        }
    }

    fn placeholder_url(&self) -> String {
        format!("{}/{}", self.base_url, PLACEHOLDER_ICON)
    }

    /// Source shown by the `<img>` element for picture-less categories too.
    pub fn image_source(&self) -> String {
        match self.category {
            MediaCategory::Gif => self.file_url.clone(),
            MediaCategory::Image => self
                .preview_url
                .clone()
                .unwrap_or_else(|| self.file_url.clone()),
            _ => self.placeholder_url(),
        }
    }

    fn open_graph_tags(&self) -> String {
        let url = escape(&self.file_url);
        let res = self.record.resolution;
        match self.category {
            MediaCategory::Image | MediaCategory::Gif => format!(
                r#"<meta property="og:type" content="image.other" />
    <meta property="og:image" content="{url}" />
    <meta property="og:image:secure_url" content="{url}" />
    <meta property="og:image:alt" content="{name}" />
    <meta property="og:image:width" content="{w}" />
    <meta property="og:image:height" content="{h}" />
    <meta name="twitter:card" content="summary_large_image" />"#,
                url = url,
                name = escape(&self.record.stored_name),
                w = res.width,
                h = res.height,
            ),
            MediaCategory::Video => format!(
                r#"<meta property="og:type" content="video.other" />
    <meta property="og:video" content="{url}" />
    <meta property="og:video:secure_url" content="{url}" />
    <meta property="og:video:width" content="{w}" />
    <meta property="og:video:height" content="{h}" />"#,
                url = url,
                w = res.width,
                h = res.height,
            ),
            MediaCategory::Audio => format!(
                r#"<meta property="og:audio" content="{url}" />
    <meta property="og:audio:secure_url" content="{url}" />
    <meta property="og:audio:type" content="audio.other" />"#,
                url = url,
            ),
            MediaCategory::Other => String::new(),
        }
    }

    fn media_element(&self) -> String {
        let src = escape(&self.file_url);
        match self.category {
            MediaCategory::Audio => {
                format!(r#"<audio controls><source src="{}"></audio>"#, src)
            }
            MediaCategory::Video => {
                format!(r#"<video controls><source src="{}"></video>"#, src)
            }
            _ => format!(
                r#"<img src="{}" alt="{}" />"#,
                escape(&self.image_source()),
                escape(&self.record.stored_name)
            ),
        }
    }

    fn stats(&self) -> String {
        let record = self.record;
        let mut stats = format!(
            "Uploaded by: {}<br>\n      Uploaded at: {}<br>\n      Size: {} MB<br>",
            escape(&record.owner),
            escape(&record.created_at),
            record.size_mb
        );
        if record.resolution.is_known() {
            stats.push_str(&format!("\n      Resolution: {}", record.resolution));
        }
        stats
    }

    pub fn render(&self) -> String {
        let branding = self.branding;
        let name = escape(&self.record.stored_name);
        let encoded = urlencoding::encode(&self.record.stored_name);

        format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    {og_tags}
    <meta property="og:title" content="{og_title}" />
    <meta property="og:description" content="{og_description}" />
    <meta name="theme-color" content="{theme_color}" />
    <link rel="icon" href="{favicon}" type="image/png" />
    <link href="{base}/oembed/{encoded}" title="oEmbed" rel="alternate" type="application/json+oembed" />
    <style>
      body {{ display: flex; flex-direction: column; justify-content: center; align-items: center;
             min-height: 100vh; background: #18191d; margin: 0; font-family: Arial, sans-serif; }}
      .file-container {{ max-width: 30%; border-radius: 10px;
             box-shadow: 0px 60px 100px 0px {shadow}, 0px 45px 26px 0px rgba(0,0,0,0.14); }}
      img, video {{ width: 100%; height: auto; display: block; border-radius: 10px; max-height: 50vh; }}
      .filename {{ font-size: 2rem; font-weight: bold; color: #a855f7; text-align: center; }}
      .button-container {{ display: flex; gap: 10px; margin-top: 20px; }}
      .button {{ width: 220px; height: 50px; font-size: 15px; font-weight: bold; border: none;
             color: #fff; background: #111; cursor: pointer; border-radius: 10px; }}
      .stats {{ font-size: 20px; font-weight: bold; color: #434552; text-align: center; margin-top: 65px; }}
      .copyright {{ position: absolute; bottom: 10px; font-size: 15px; font-weight: bold; color: #434552; }}
      a {{ color: #434552; }}
    </style>
  </head>
  <body>
    <h1 class="filename">{name}</h1>
    <div class="file-container">
      {media}
    </div>
    <div class="button-container">
      <a class="button" href="{base}/download/{encoded}">Download</a>
      <a class="button" href="{file_url}">Direct link</a>
    </div>
    <div class="stats">
      {stats}
    </div>
    <div class="copyright">{copyright}</div>
  </body>
</html>
"#,
            title = escape(&branding.site_title),
            og_tags = self.open_graph_tags(),
            og_title = escape(&branding.og_title),
            og_description = escape(&branding.og_description),
            theme_color = escape(&self.theme_color()),
            favicon = escape(&branding.site_favicon),
            base = escape(self.base_url),
            encoded = encoded,
            shadow = escape(&self.shadow_color()),
            name = name,
            media = self.media_element(),
            file_url = escape(&self.file_url),
            stats = self.stats(),
            copyright = escape(&branding.copyright_text),
        )
    }
}

pub fn not_found_page(branding: &BrandingConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{title} - Not found</title>
    <link rel="icon" href="{favicon}" type="image/png" />
    <style>
      body {{ display: flex; justify-content: center; align-items: center; height: 100vh;
             background: #18191d; margin: 0; font-family: Arial, sans-serif; color: #434552; }}
    </style>
  </head>
  <body>
    <h1>404 - File not found</h1>
  </body>
</html>
"#,
        title = escape(&branding.site_title),
        favicon = escape(&branding.site_favicon),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sharehost_core::{HexColor, Resolution};

    fn record(name: &str, resolution: Resolution) -> UploadRecord {
        UploadRecord {
            owner: "alice".to_string(),
            stored_name: name.to_string(),
            created_at: "01.03.2024, 14:05:09".to_string(),
            size_bytes: 500_000,
            size_mb: Decimal::new(477, 3),
            dominant_color: HexColor::parse("#c0ffee").unwrap(),
            resolution,
        }
    }

    fn page<'a>(
        branding: &'a BrandingConfig,
        record: &'a UploadRecord,
        category: MediaCategory,
        preview: bool,
    ) -> ViewPage<'a> {
        ViewPage {
            branding,
            base_url: "https://x.test",
            record,
            category,
            file_url: format!("https://x.test/uploads/alice/{}", record.stored_name),
            preview_url: preview
                .then(|| format!("https://x.test/uploads/alice/preview/{}", record.stored_name)),
        }
    }

    #[test]
    fn test_image_page_uses_preview_and_dominant_shadow() {
        let branding = BrandingConfig::default();
        let record = record("cat.png", Resolution::new(640, 480));
        let html = page(&branding, &record, MediaCategory::Image, true).render();

        assert!(html.contains(r#"src="https://x.test/uploads/alice/preview/cat.png""#));
        assert!(html.contains(r#"og:image:width" content="640""#));
        assert!(html.contains("twitter:card"));
        assert!(html.contains("0px 60px 100px 0px #c0ffee"));
        assert!(html.contains("Size: 0.477 MB"));
        assert!(html.contains("Resolution: 640x480"));
        assert!(html.contains("https://x.test/oembed/cat.png"));
    }

    #[test]
    fn test_image_without_preview_falls_back_to_original() {
        let branding = BrandingConfig::default();
        let record = record("cat.png", Resolution::new(640, 480));
        let view = page(&branding, &record, MediaCategory::Image, false);
        assert_eq!(view.image_source(), "https://x.test/uploads/alice/cat.png");
    }

    #[test]
    fn test_other_files_show_placeholder() {
        let branding = BrandingConfig::default();
        let record = record("notes.zip", Resolution::UNKNOWN);
        let html = page(&branding, &record, MediaCategory::Other, false).render();

        assert!(html.contains("https://x.test/assets/file.png"));
        assert!(!html.contains("og:image"));
        assert!(!html.contains("Resolution:"));
    }

    #[test]
    fn test_video_page() {
        let branding = BrandingConfig::default();
        let record = record("clip.mp4", Resolution::new(1920, 1080));
        let html = page(&branding, &record, MediaCategory::Video, false).render();

        assert!(html.contains("<video controls>"));
        assert!(html.contains(r#"og:video:height" content="1080""#));
        assert!(html.contains(&format!("0px 60px 100px 0px {}", branding.box_shadow_color)));
    }

    #[test]
    fn test_theme_color_marker() {
        let mut branding = BrandingConfig::default();
        let record = record("cat.png", Resolution::UNKNOWN);

        branding.theme_color = "#123456".to_string();
        assert_eq!(
            page(&branding, &record, MediaCategory::Image, false).theme_color(),
            "#123456"
        );

        branding.theme_color = "&dominantColor".to_string();
        assert_eq!(
            page(&branding, &record, MediaCategory::Image, false).theme_color(),
            "#c0ffee"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let mut branding = BrandingConfig::default();
        branding.copyright_text = "<script>alert(1)</script>".to_string();
        let record = record("cat.png", Resolution::UNKNOWN);
        let html = page(&branding, &record, MediaCategory::Image, false).render();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
