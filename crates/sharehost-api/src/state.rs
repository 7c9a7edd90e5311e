//! Shared application state.

use std::sync::Arc;

use sharehost_core::{Config, Notifier, RecordStore, UserStore};
use sharehost_processing::{UploadPipeline, VideoProbe};
use sharehost_storage::LocalStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<LocalStorage>,
    pub records: Arc<dyn RecordStore>,
    pub users: Arc<dyn UserStore>,
    pub notifier: Arc<dyn Notifier>,
    pub pipeline: Arc<UploadPipeline>,
}

impl AppState {
    /// Wire the upload pipeline to the same storage, store and notifier the
    /// handlers use.
    pub fn new(
        config: Arc<Config>,
        storage: Arc<LocalStorage>,
        records: Arc<dyn RecordStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        video_probe: Arc<dyn VideoProbe>,
    ) -> Self {
        let pipeline = Arc::new(UploadPipeline::new(
            config.processing().clone(),
            config.base_url(),
            storage.clone(),
            records.clone(),
            notifier.clone(),
            video_probe,
        ));

        Self {
            config,
            storage,
            records,
            users,
            notifier,
            pipeline,
        }
    }
}
