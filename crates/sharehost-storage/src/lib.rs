//! Sharehost storage
//!
//! Uploads live on the local filesystem, one directory per owner:
//!
//! ```text
//! <upload_dir>/<owner>/<uuid>.<ext>
//! <upload_dir>/<owner>/preview/<uuid>.<ext>
//! ```
//!
//! Stored names are generated, so they never depend on the client's filename
//! beyond its extension.

mod error;
mod local;

pub use error::{StorageError, StorageResult};
pub use local::{LocalStorage, StoredFile, PREVIEW_DIR};
