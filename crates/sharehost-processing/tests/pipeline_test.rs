//! Upload pipeline integration tests against local storage and in-memory stores.
//!
//! Run with: `cargo test -p sharehost-processing --test pipeline_test`

use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use rust_decimal::Decimal;
use sharehost_core::{
    AppError, HexColor, MediaCategory, Notification, Notifier, ProcessingConfig, RecordStore,
    Resolution, Severity, UploadRecord,
};
use sharehost_db::InMemoryRecordStore;
use sharehost_processing::{ProbeError, UploadPipeline, VideoProbe};
use sharehost_storage::LocalStorage;
use tempfile::TempDir;

const BASE_URL: &str = "https://files.example";

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    fn titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|n| n.title).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

struct FixedProbe(Resolution);

#[async_trait]
impl VideoProbe for FixedProbe {
    async fn dimensions(&self, _path: &Path) -> Result<Resolution, ProbeError> {
        Ok(self.0)
    }
}

struct BrokenProbe;

#[async_trait]
impl VideoProbe for BrokenProbe {
    async fn dimensions(&self, _path: &Path) -> Result<Resolution, ProbeError> {
        Err(ProbeError::Ffprobe("not installed".to_string()))
    }
}

struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert(&self, _record: &UploadRecord) -> Result<(), AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    async fn find(&self, _owner: &str, _name: &str) -> Result<Option<UploadRecord>, AppError> {
        Ok(None)
    }

    async fn find_by_name(&self, _name: &str) -> Result<Option<UploadRecord>, AppError> {
        Ok(None)
    }

    async fn delete(&self, _owner: &str, _name: Option<&str>) -> Result<u64, AppError> {
        Ok(0)
    }
}

struct Harness {
    pipeline: Arc<UploadPipeline>,
    storage: Arc<LocalStorage>,
    notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

async fn harness(
    config: ProcessingConfig,
    records: Arc<dyn RecordStore>,
    probe: Arc<dyn VideoProbe>,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(
        LocalStorage::new(dir.path().join("uploads"), format!("{}/uploads", BASE_URL))
            .await
            .unwrap(),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Arc::new(UploadPipeline::new(
        config,
        BASE_URL,
        storage.clone(),
        records,
        notifier.clone(),
        probe,
    ));

    Harness {
        pipeline,
        storage,
        notifier,
        _dir: dir,
    }
}

fn red_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_png_upload_end_to_end() {
    let records = Arc::new(InMemoryRecordStore::new());
    let h = harness(
        ProcessingConfig::default(),
        records.clone(),
        Arc::new(BrokenProbe),
    )
    .await;

    // Trailing bytes after IEND are ignored by decoders.
    let mut data = red_png(40, 30);
    data.resize(500_000, 0);

    let stored = h.storage.store("alice", "cat.png", &data).await.unwrap();
    let name = stored.stored_name.clone();
    let outcome = h.pipeline.process_upload(stored).await;

    assert_eq!(outcome.category, MediaCategory::Image);
    assert_eq!(
        outcome.links.preview,
        format!("{}/uploads/alice/preview/{}", BASE_URL, name)
    );
    assert_eq!(outcome.links.view, format!("{}/view/{}", BASE_URL, name));

    let record = outcome.enrichment.await.unwrap();
    assert_eq!(record.size_bytes, 500_000);
    assert_eq!(record.size_mb, Decimal::from_str("0.477").unwrap());
    assert_eq!(record.resolution, Resolution::new(40, 30));
    assert_eq!(record.dominant_color, HexColor::white());
    assert_eq!(records.all(), vec![record]);

    let titles = h.notifier.titles();
    assert_eq!(titles, vec!["New file uploaded".to_string()]);
}

#[tokio::test]
async fn test_video_upload_uses_probe_and_has_no_preview() {
    let records = Arc::new(InMemoryRecordStore::new());
    let h = harness(
        ProcessingConfig::default(),
        records.clone(),
        Arc::new(FixedProbe(Resolution::new(1920, 1080))),
    )
    .await;

    let stored = h
        .storage
        .store("bob", "clip.mp4", &[0u8; 4096])
        .await
        .unwrap();
    let preview_path = stored.preview_path.clone();
    let outcome = h.pipeline.process_upload(stored).await;

    assert_eq!(outcome.category, MediaCategory::Video);
    assert_eq!(outcome.links.preview, outcome.links.file);
    assert!(!preview_path.exists());

    let record = outcome.enrichment.await.unwrap();
    assert_eq!(record.resolution, Resolution::new(1920, 1080));
    assert_eq!(record.dominant_color, HexColor::white());
}

#[tokio::test]
async fn test_probe_failure_falls_back_to_unknown_resolution() {
    let records = Arc::new(InMemoryRecordStore::new());
    let h = harness(
        ProcessingConfig::default(),
        records.clone(),
        Arc::new(BrokenProbe),
    )
    .await;

    let stored = h.storage.store("bob", "clip.mp4", &[0u8; 16]).await.unwrap();
    let record = h.pipeline.process_upload(stored).await.enrichment.await.unwrap();

    assert_eq!(record.resolution, Resolution::UNKNOWN);
    assert_eq!(records.all().len(), 1);
}

#[tokio::test]
async fn test_undecodable_image_keeps_upload() {
    let records = Arc::new(InMemoryRecordStore::new());
    let h = harness(
        ProcessingConfig::default(),
        records.clone(),
        Arc::new(BrokenProbe),
    )
    .await;

    let stored = h
        .storage
        .store("alice", "broken.png", b"definitely not a png")
        .await
        .unwrap();
    let path = stored.path.clone();
    let outcome = h.pipeline.process_upload(stored).await;

    assert_eq!(outcome.links.preview, outcome.links.file);
    let record = outcome.enrichment.await.unwrap();
    assert_eq!(record.resolution, Resolution::UNKNOWN);
    assert!(path.exists());
}

#[tokio::test]
async fn test_dominant_color_enabled() {
    let config = ProcessingConfig {
        use_dominant_color: true,
        dominant_color_static: HexColor::parse("#123456").unwrap(),
        ..ProcessingConfig::default()
    };
    let records = Arc::new(InMemoryRecordStore::new());
    let h = harness(config, records.clone(), Arc::new(BrokenProbe)).await;

    let stored = h
        .storage
        .store("alice", "red.png", &red_png(32, 32))
        .await
        .unwrap();
    let record = h.pipeline.process_upload(stored).await.enrichment.await.unwrap();
    assert_ne!(record.dominant_color.as_str(), "#123456");
    assert_ne!(record.dominant_color, HexColor::white());

    let stored = h
        .storage
        .store("alice", "notes.txt", b"plain text")
        .await
        .unwrap();
    let record = h.pipeline.process_upload(stored).await.enrichment.await.unwrap();
    assert_eq!(record.dominant_color, HexColor::white());
}

#[tokio::test]
async fn test_persistence_failure_is_reported_and_file_kept() {
    let h = harness(
        ProcessingConfig::default(),
        Arc::new(FailingStore),
        Arc::new(BrokenProbe),
    )
    .await;

    let stored = h
        .storage
        .store("alice", "notes.txt", b"hello")
        .await
        .unwrap();
    let path = stored.path.clone();
    h.pipeline.process_upload(stored).await.enrichment.await.unwrap();

    assert!(path.exists());
    let sent = h.notifier.sent();
    let db_error = sent
        .iter()
        .find(|n| n.title == "Database error")
        .expect("database error notification");
    assert_eq!(db_error.severity, Severity::Error);
    // The upload summary is still sent.
    assert!(sent.iter().any(|n| n.title == "New file uploaded"));
}

#[tokio::test]
async fn test_metadata_removal_notifications() {
    let config = ProcessingConfig {
        remove_metadata: true,
        ..ProcessingConfig::default()
    };
    let records = Arc::new(InMemoryRecordStore::new());
    let h = harness(config, records, Arc::new(BrokenProbe)).await;

    let stored = h
        .storage
        .store("alice", "cat.png", &red_png(8, 8))
        .await
        .unwrap();
    h.pipeline.process_upload(stored).await.enrichment.await.unwrap();
    assert!(h.notifier.titles().contains(&"Metadata removed".to_string()));

    // Formats without a scrubber are skipped silently.
    let before = h.notifier.sent().len();
    let stored = h
        .storage
        .store("alice", "notes.txt", b"hello")
        .await
        .unwrap();
    h.pipeline.process_upload(stored).await.enrichment.await.unwrap();
    let new: Vec<String> = h.notifier.titles().split_off(before);
    assert_eq!(new, vec!["New file uploaded".to_string()]);
}
