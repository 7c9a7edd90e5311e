//! Test helpers: an application wired to in-memory stores and a temp directory.
//!
//! No database is needed; run with `cargo test -p sharehost-api`.

#![allow(dead_code)]

pub mod fixtures;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use sharehost_api::setup::routes;
use sharehost_api::AppState;
use sharehost_core::{
    BrandingConfig, Config, Notification, Notifier, NotifierConfig, ProcessingConfig, Resolution,
    ServerConfig, SharehostConfig, UploadRecord, User, UserRole, UserStore,
};
use sharehost_db::{InMemoryRecordStore, InMemoryUserStore};
use sharehost_processing::{ProbeError, VideoProbe};
use sharehost_storage::LocalStorage;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:3000";
pub const JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const PASSWORD: &str = "correct horse battery staple";

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

/// Stands in for ffprobe.
pub struct FixedProbe(pub Resolution);

#[async_trait]
impl VideoProbe for FixedProbe {
    async fn dimensions(&self, _path: &Path) -> Result<Resolution, ProbeError> {
        Ok(self.0)
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub records: Arc<InMemoryRecordStore>,
    pub users: Arc<InMemoryUserStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("uploads")
    }

    /// Add an account and return its password-login token.
    pub async fn create_user(&self, username: &str, role: UserRole) -> String {
        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let id = self.users.list_usernames().await.unwrap().len() as i32 + 1;
        self.users.add(User {
            id,
            username: username.to_string(),
            password_hash: hash,
            token: None,
            role,
        });

        let response = self
            .server
            .post("/login")
            .json(&serde_json::json!({ "username": username, "password": PASSWORD }))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = response.json();
        body["token"].as_str().unwrap().to_string()
    }

    /// Wait until the background part of an upload has stored its record.
    pub async fn wait_for_record(&self, stored_name: &str) -> UploadRecord {
        for _ in 0..100 {
            if let Some(record) = self
                .records
                .all()
                .into_iter()
                .find(|r| r.stored_name == stored_name)
            {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("record for {} was never stored", stored_name);
    }
}

pub fn test_config(root: &Path, processing: ProcessingConfig) -> Config {
    Config::new(SharehostConfig {
        server: ServerConfig {
            port: 3000,
            environment: "test".to_string(),
            base_url: BASE_URL.to_string(),
            database_url: "postgresql://localhost/sharehost_test".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: JWT_SECRET.to_string(),
            max_file_size_bytes: 10 * 1024 * 1024,
            upload_dir: root.join("uploads"),
            public_dir: root.join("public"),
            redirect_url: "https://example.com/".to_string(),
        },
        processing,
        branding: BrandingConfig::default(),
        notifier: NotifierConfig {
            webhook_url: None,
            webhook_name: "sharehost".to_string(),
            success_color: 0x57f287,
            error_color: 0xed4245,
        },
    })
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(ProcessingConfig::default()).await
}

pub async fn setup_test_app_with(processing: ProcessingConfig) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let public_assets = temp_dir.path().join("public").join("assets");
    std::fs::create_dir_all(&public_assets).unwrap();
    std::fs::write(public_assets.join("file.png"), fixtures::png_bytes(8, 8)).unwrap();

    let config = test_config(temp_dir.path(), processing);
    let storage = LocalStorage::new(
        config.upload_dir().clone(),
        format!("{}/uploads", BASE_URL),
    )
    .await
    .expect("Failed to create local storage");

    let records = Arc::new(InMemoryRecordStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    let notifier = Arc::new(RecordingNotifier::default());

    let state = Arc::new(AppState::new(
        Arc::new(config),
        Arc::new(storage),
        records.clone(),
        users.clone(),
        notifier.clone(),
        Arc::new(FixedProbe(Resolution::new(1920, 1080))),
    ));

    let app = routes::setup_routes(state.clone());
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        records,
        users,
        notifier,
        temp_dir,
    }
}
