//! Byte-range access to a file on disk.
//!
//! Every call opens the file, performs exactly one positioned read or write
//! and drops the handle before returning, on the error path as well.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Positioned I/O capability used by the scrubber.
#[async_trait]
pub trait RangeIo: Send + Sync {
    /// Read up to `size` bytes starting at `offset`. Shorter at end of file.
    async fn read_at(&self, offset: u64, size: usize) -> std::io::Result<Vec<u8>>;

    /// Overwrite bytes starting at `offset`. Never changes the file length
    /// when the range lies inside the file.
    async fn write_at(&self, offset: u64, bytes: &[u8]) -> std::io::Result<()>;

    async fn len(&self) -> std::io::Result<u64>;

    /// Truncate or extend the file to `len` bytes.
    async fn set_len(&self, len: u64) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileRangeIo {
    path: PathBuf,
}

impl FileRangeIo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RangeIo for FileRangeIo {
    async fn read_at(&self, offset: u64, size: usize) -> std::io::Result<Vec<u8>> {
        let mut file = fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;

        let mut buf = Vec::with_capacity(size);
        file.take(size as u64).read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn write_at(&self, offset: u64, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        file.write_all(bytes).await?;
        // tokio completes writes in the background; flush before the handle drops.
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }

    async fn len(&self) -> std::io::Result<u64> {
        Ok(fs::metadata(&self.path).await?.len())
    }

    async fn set_len(&self, len: u64) -> std::io::Result<()> {
        let file = OpenOptions::new().write(true).open(&self.path).await?;
        file.set_len(len).await?;
        file.sync_data().await
    }
}
