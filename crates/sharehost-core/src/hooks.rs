//! Capability traits injected into the upload pipeline and HTTP layer.
//!
//! The core never depends on a concrete database or chat service. The db
//! crate implements the stores and the infra crate implements the notifier.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{UploadRecord, User};

/// Persistence for upload records, keyed by `(owner, stored_name)`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Called exactly once per upload, never retried.
    async fn insert(&self, record: &UploadRecord) -> Result<(), AppError>;

    async fn find(&self, owner: &str, stored_name: &str)
        -> Result<Option<UploadRecord>, AppError>;

    /// Lookup by stored name alone; names are globally unique.
    async fn find_by_name(&self, stored_name: &str) -> Result<Option<UploadRecord>, AppError>;

    /// Delete one record, or every record of `owner` when `stored_name` is `None`.
    /// Returns the number of rows removed.
    async fn delete(&self, owner: &str, stored_name: Option<&str>) -> Result<u64, AppError>;
}

/// Account storage used by authentication and the admin endpoints.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn set_token(&self, username: &str, token: &str) -> Result<(), AppError>;

    async fn list_usernames(&self) -> Result<Vec<String>, AppError>;

    /// Returns `false` when no such user existed.
    async fn delete(&self, username: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }
}

/// Best-effort operator notifications.
///
/// Implementations must return immediately and swallow their own failures;
/// callers never observe whether delivery succeeded.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Used when no webhook is configured.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notification: Notification) {}
}
