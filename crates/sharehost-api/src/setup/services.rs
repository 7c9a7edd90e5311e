//! Service and repository wiring

use std::sync::Arc;

use anyhow::{Context, Result};
use sharehost_core::{Config, Notification, Notifier, RecordStore, UserStore};
use sharehost_db::{FileRecordRepository, UserRepository};
use sharehost_processing::{FfprobeVideoProbe, VideoProbe};
use sharehost_storage::LocalStorage;
use sqlx::PgPool;

use crate::state::AppState;

pub async fn initialize_services(config: Config, pool: PgPool) -> Result<Arc<AppState>> {
    let storage = LocalStorage::new(
        config.upload_dir().clone(),
        format!("{}/uploads", config.base_url()),
    )
    .await
    .context("Failed to initialize local storage")?;
    tracing::info!(path = %storage.base_path().display(), "Local storage ready");

    let records: Arc<dyn RecordStore> = Arc::new(FileRecordRepository::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool));
    let notifier: Arc<dyn Notifier> = sharehost_infra::notifier_from_config(config.notifier())?;
    let video_probe: Arc<dyn VideoProbe> = Arc::new(FfprobeVideoProbe::new(
        config.processing().ffprobe_path.clone(),
    ));

    Ok(Arc::new(AppState::new(
        Arc::new(config),
        Arc::new(storage),
        records,
        users,
        notifier,
        video_probe,
    )))
}

/// Make sure every known user has `<user>/` and `<user>/preview/`.
/// Failures are reported but do not stop startup.
pub async fn prepare_user_directories(state: &AppState) {
    let usernames = match state.users.list_usernames().await {
        Ok(names) => names,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list users for directory setup");
            state.notifier.notify(Notification::error(
                "System",
                format!("Could not list users: {}", e),
            ));
            return;
        }
    };

    let mut failed = Vec::new();
    for username in &usernames {
        if let Err(e) = state.storage.ensure_owner_dirs(username).await {
            tracing::error!(error = %e, username = %username, "Failed to create user directory");
            failed.push(username.as_str());
        }
    }

    if failed.is_empty() {
        tracing::info!(users = usernames.len(), "User directories ready");
        state.notifier.notify(Notification::success(
            "System",
            format!("Upload directories ready for {} user(s)", usernames.len()),
        ));
    } else {
        state.notifier.notify(Notification::error(
            "System",
            format!("Could not create directories for: {}", failed.join(", ")),
        ));
    }
}
