use crate::error::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Name of the per-owner subdirectory holding WebP previews.
pub const PREVIEW_DIR: &str = "preview";

/// A file that has been written to its final location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub owner: String,
    pub stored_name: String,
    pub path: PathBuf,
    pub preview_path: PathBuf,
}

/// Local filesystem storage, one directory per owner
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root upload directory (e.g., "uploads")
    /// * `base_url` - Public URL the root directory is served under (e.g., "https://host/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Owner names and stored names must each be a single plain path segment.
    fn validate_segment(segment: &str) -> StorageResult<()> {
        if segment.is_empty()
            || segment == "."
            || segment.contains("..")
            || segment.contains('/')
            || segment.contains('\\')
            || segment.contains('\0')
        {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a valid path segment",
                segment
            )));
        }
        Ok(())
    }

    /// Generate a collision-free name that keeps the client's extension as supplied.
    ///
    /// Only extensions carrying a path separator or NUL are dropped.
    fn generate_name(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && !e.contains(['/', '\\', '\0']));

        match ext {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }

    pub fn owner_dir(&self, owner: &str) -> StorageResult<PathBuf> {
        Self::validate_segment(owner)?;
        Ok(self.base_path.join(owner))
    }

    pub fn file_path(&self, owner: &str, stored_name: &str) -> StorageResult<PathBuf> {
        Self::validate_segment(stored_name)?;
        Ok(self.owner_dir(owner)?.join(stored_name))
    }

    pub fn preview_path(&self, owner: &str, stored_name: &str) -> StorageResult<PathBuf> {
        Self::validate_segment(stored_name)?;
        Ok(self.owner_dir(owner)?.join(PREVIEW_DIR).join(stored_name))
    }

    /// Create `<owner>/` and `<owner>/preview/`. Safe to call repeatedly.
    pub async fn ensure_owner_dirs(&self, owner: &str) -> StorageResult<PathBuf> {
        let dir = self.owner_dir(owner)?;
        fs::create_dir_all(dir.join(PREVIEW_DIR)).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(dir)
    }

    /// Reserve a unique destination for a new upload without writing anything.
    pub async fn allocate(&self, owner: &str, original_name: &str) -> StorageResult<StoredFile> {
        self.ensure_owner_dirs(owner).await?;

        let stored_name = Self::generate_name(original_name);
        Ok(StoredFile {
            owner: owner.to_string(),
            path: self.file_path(owner, &stored_name)?,
            preview_path: self.preview_path(owner, &stored_name)?,
            stored_name,
        })
    }

    /// Write an upload to a freshly allocated path.
    pub async fn store(
        &self,
        owner: &str,
        original_name: &str,
        data: &[u8],
    ) -> StorageResult<StoredFile> {
        let stored = self.allocate(owner, original_name).await?;
        let start = std::time::Instant::now();

        // create_new: a name clash fails instead of overwriting another upload
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&stored.path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to create file {}: {}",
                    stored.path.display(),
                    e
                ))
            })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                stored.path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                stored.path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %stored.path.display(),
            owner = %owner,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(stored)
    }

    pub async fn exists(&self, owner: &str, stored_name: &str) -> StorageResult<bool> {
        let path = self.file_path(owner, stored_name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    pub async fn preview_exists(&self, owner: &str, stored_name: &str) -> StorageResult<bool> {
        let path = self.preview_path(owner, stored_name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Remove a file and its preview.
    ///
    /// Fails with [`StorageError::NotFound`] when the file itself is absent.
    /// A missing preview is not an error.
    pub async fn delete(&self, owner: &str, stored_name: &str) -> StorageResult<()> {
        let path = self.file_path(owner, stored_name)?;
        let preview = self.preview_path(owner, stored_name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!("{}/{}", owner, stored_name)));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        if fs::try_exists(&preview).await.unwrap_or(false) {
            if let Err(e) = fs::remove_file(&preview).await {
                tracing::warn!(
                    path = %preview.display(),
                    error = %e,
                    "Failed to delete preview"
                );
            }
        }

        tracing::info!(
            path = %path.display(),
            owner = %owner,
            "Local storage delete successful"
        );

        Ok(())
    }

    /// Stored names of an owner, sorted. The preview directory is excluded.
    /// An owner without a directory has no files.
    pub async fn list(&self, owner: &str) -> StorageResult<Vec<String>> {
        let dir = self.owner_dir(owner)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != PREVIEW_DIR {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Recursively remove an owner's directory. Missing directories are ignored.
    pub async fn remove_owner(&self, owner: &str) -> StorageResult<()> {
        let dir = self.owner_dir(owner)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_dir_all(&dir).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to remove directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        tracing::info!(path = %dir.display(), owner = %owner, "Removed owner directory");
        Ok(())
    }

    /// Public URL for a stored file
    pub fn file_url(&self, owner: &str, stored_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(owner),
            urlencoding::encode(stored_name)
        )
    }

    /// Public URL for a preview
    pub fn preview_url(&self, owner: &str, stored_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(owner),
            PREVIEW_DIR,
            urlencoding::encode(stored_name)
        )
    }
}
