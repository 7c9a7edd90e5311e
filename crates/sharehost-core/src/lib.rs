//! Sharehost Core Library
//!
//! Domain models, error types, configuration and the capability traits
//! (record store, user store, notifier) shared by every sharehost crate.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;

pub use config::{
    BrandingConfig, Config, NotifierConfig, ProcessingConfig, ServerConfig, SharehostConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use hooks::{
    Notification, Notifier, NoOpNotifier, RecordStore, Severity, UserStore,
};
pub use models::{
    size_in_megabytes, HexColor, MediaCategory, Resolution, UploadLinks, UploadRecord, User,
    UserRole,
};
