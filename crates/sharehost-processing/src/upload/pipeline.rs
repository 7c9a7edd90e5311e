//! Upload pipeline: preview → scrub → respond → enrich → persist → notify.
//!
//! Everything after the file has been stored is best effort. A failing step
//! is logged (and reported to the notifier where an operator should know)
//! and replaced by its fallback value; the stored upload is never removed.

use std::fmt;
use std::sync::Arc;

use sharehost_core::{
    size_in_megabytes, HexColor, MediaCategory, Notification, Notifier, ProcessingConfig,
    RecordStore, Resolution, UploadLinks, UploadRecord,
};
use sharehost_storage::{LocalStorage, StoredFile};
use tokio::task::JoinHandle;

use crate::color::ColorExtractor;
use crate::preview::PreviewGenerator;
use crate::resolution::{ResolutionProber, VideoProbe};
use crate::scrub::{MetadataScrubber, ScrubError};
use crate::timestamp::{file_created_at, format_timestamp};

/// Linear progress of a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    PreviewDone,
    MetadataScrubbed,
    Responded,
    Enriched,
    Persisted,
    Notified,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::PreviewDone => "preview_done",
            UploadStage::MetadataScrubbed => "metadata_scrubbed",
            UploadStage::Responded => "responded",
            UploadStage::Enriched => "enriched",
            UploadStage::Persisted => "persisted",
            UploadStage::Notified => "notified",
        };
        f.write_str(name)
    }
}

/// Result of the synchronous part of an upload.
pub struct UploadOutcome {
    pub links: UploadLinks,
    pub category: MediaCategory,
    /// Completes once the record has been persisted and the notification sent.
    pub enrichment: JoinHandle<UploadRecord>,
}

pub struct UploadPipeline {
    config: ProcessingConfig,
    base_url: String,
    storage: Arc<LocalStorage>,
    records: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    previews: PreviewGenerator,
    scrubber: MetadataScrubber,
    colors: ColorExtractor,
    prober: ResolutionProber,
}

impl UploadPipeline {
    pub fn new(
        config: ProcessingConfig,
        base_url: impl Into<String>,
        storage: Arc<LocalStorage>,
        records: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        video_probe: Arc<dyn VideoProbe>,
    ) -> Self {
        Self {
            previews: PreviewGenerator::new(config.preview_quality),
            scrubber: MetadataScrubber::new(),
            colors: ColorExtractor::new(config.palette_color_count, config.palette_quality),
            prober: ResolutionProber::new(video_probe),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
            storage,
            records,
            notifier,
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    fn advance(stored: &StoredFile, stage: UploadStage) {
        tracing::debug!(
            owner = %stored.owner,
            file = %stored.stored_name,
            stage = %stage,
            "Upload stage reached"
        );
    }

    /// Run preview generation and metadata removal, then hand back the links.
    /// Enrichment, persistence and notification continue in a background task.
    #[tracing::instrument(skip_all, fields(owner = %stored.owner, file = %stored.stored_name))]
    pub async fn process_upload(self: &Arc<Self>, stored: StoredFile) -> UploadOutcome {
        Self::advance(&stored, UploadStage::Received);
        let category = self.config.classify(&stored.stored_name);

        let has_preview = self.generate_preview(&stored, category).await;
        Self::advance(&stored, UploadStage::PreviewDone);

        if self.config.remove_metadata {
            self.scrub_metadata(&stored).await;
        }
        Self::advance(&stored, UploadStage::MetadataScrubbed);

        let links = self.links(&stored, has_preview);
        Self::advance(&stored, UploadStage::Responded);

        let pipeline = Arc::clone(self);
        let view_url = links.view.clone();
        let enrichment = tokio::spawn(async move {
            let record = pipeline.enrich(&stored, category).await;
            Self::advance(&stored, UploadStage::Enriched);

            pipeline.persist(&record).await;
            Self::advance(&stored, UploadStage::Persisted);

            pipeline.notify_upload(&record, &view_url);
            Self::advance(&stored, UploadStage::Notified);
            record
        });

        UploadOutcome {
            links,
            category,
            enrichment,
        }
    }

    /// Returns whether a preview now exists.
    async fn generate_preview(&self, stored: &StoredFile, category: MediaCategory) -> bool {
        if !category.has_preview() {
            return false;
        }

        match self
            .previews
            .generate(&stored.path, &stored.preview_path)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = %stored.stored_name,
                    "Preview generation failed, serving original instead"
                );
                false
            }
        }
    }

    async fn scrub_metadata(&self, stored: &StoredFile) {
        match self.scrubber.scrub(&stored.path).await {
            Ok(report) => {
                tracing::info!(
                    file = %stored.stored_name,
                    format = report.format,
                    blocks_removed = report.blocks_removed,
                    "Metadata removed"
                );
                self.notifier.notify(Notification::success(
                    "Metadata removed",
                    format!(
                        "Removed {} metadata block(s) from {}",
                        report.blocks_removed, stored.stored_name
                    ),
                ));
            }
            Err(ScrubError::UnsupportedFormat) => {
                tracing::debug!(
                    file = %stored.stored_name,
                    "Metadata removal skipped for unsupported format"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = %stored.stored_name,
                    "Metadata removal failed"
                );
                self.notifier.notify(Notification::error(
                    "Metadata removal failed",
                    format!("{}: {}", stored.stored_name, e),
                ));
            }
        }
    }

    pub fn links(&self, stored: &StoredFile, has_preview: bool) -> UploadLinks {
        let file = self.storage.file_url(&stored.owner, &stored.stored_name);
        let preview = if has_preview {
            self.storage
                .preview_url(&stored.owner, &stored.stored_name)
        } else {
            file.clone()
        };
        let name = urlencoding::encode(&stored.stored_name);

        UploadLinks {
            view: format!("{}/view/{}", self.base_url, name),
            delete: format!("{}/delete/{}", self.base_url, name),
            file,
            preview,
        }
    }

    async fn dominant_color(&self, stored: &StoredFile) -> HexColor {
        if !self.config.use_dominant_color {
            return self.config.dominant_color_static.clone();
        }

        match self.colors.extract(&stored.path).await {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = %stored.stored_name,
                    "Dominant color extraction failed, using static color"
                );
                self.config.dominant_color_static.clone()
            }
        }
    }

    async fn resolution(&self, stored: &StoredFile, category: MediaCategory) -> Resolution {
        match self.prober.probe(&stored.path, category).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file = %stored.stored_name,
                    "Resolution probe failed"
                );
                Resolution::UNKNOWN
            }
        }
    }

    /// Derive the persisted record. Never fails; each field has a fallback.
    pub async fn enrich(&self, stored: &StoredFile, category: MediaCategory) -> UploadRecord {
        let dominant_color = self.dominant_color(stored).await;
        let resolution = self.resolution(stored, category).await;

        let size_bytes = match tokio::fs::metadata(&stored.path).await {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::warn!(error = %e, file = %stored.stored_name, "Failed to stat upload");
                0
            }
        };
        let created_at = format_timestamp(file_created_at(&stored.path).await, self.config.timezone);

        UploadRecord {
            owner: stored.owner.clone(),
            stored_name: stored.stored_name.clone(),
            created_at,
            size_bytes,
            size_mb: size_in_megabytes(size_bytes),
            dominant_color,
            resolution,
        }
    }

    /// Single insert attempt. A failure is reported, the file stays.
    async fn persist(&self, record: &UploadRecord) {
        match self.records.insert(record).await {
            Ok(()) => {
                tracing::info!(
                    owner = %record.owner,
                    file = %record.stored_name,
                    "Upload record stored"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    owner = %record.owner,
                    file = %record.stored_name,
                    "Failed to store upload record"
                );
                self.notifier.notify(Notification::error(
                    "Database error",
                    format!("Could not store record for {}: {}", record.stored_name, e),
                ));
            }
        }
    }

    fn notify_upload(&self, record: &UploadRecord, view_url: &str) {
        self.notifier.notify(Notification::success(
            "New file uploaded",
            format!(
                "**File:** {}\n**URL:** {}\n**User:** {}\n**Size:** {} MB\n**Resolution:** {}\n**Color:** {}",
                record.stored_name,
                view_url,
                record.owner,
                record.size_mb,
                record.resolution,
                record.dominant_color
            ),
        ));
    }
}
