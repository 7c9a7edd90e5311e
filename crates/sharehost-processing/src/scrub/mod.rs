//! In-place metadata removal.
//!
//! The container is parsed with `img-parts` and every metadata block is
//! swapped for a zero-filled block of the same size that decoders skip.
//! Nothing is written until the whole file has parsed; afterwards only the
//! byte ranges that changed are written back through [`RangeIo`].

mod jpeg;
mod png;
mod range_io;
mod webp;

use std::ops::Range;
use std::path::Path;

use thiserror::Error;

pub use range_io::{FileRangeIo, RangeIo};

#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("Unsupported format for metadata removal")]
    UnsupportedFormat,

    #[error("Malformed {format} file: {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrubError {
    pub(crate) fn malformed(format: &'static str, err: img_parts::Error) -> Self {
        ScrubError::Malformed {
            format,
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrubReport {
    pub format: &'static str,
    pub blocks_removed: usize,
}

/// Output of a format scanner: the rewritten file and how many blocks were neutralized.
pub(crate) struct Neutralized {
    pub bytes: Vec<u8>,
    pub blocks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Jpeg,
    Png,
    WebP,
}

fn detect(head: &[u8]) -> Option<Container> {
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(Container::Jpeg)
    } else if head.starts_with(png::SIGNATURE) {
        Some(Container::Png)
    } else if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        Some(Container::WebP)
    } else {
        None
    }
}

/// Runs closer than this are written as one range.
const MERGE_GAP: usize = 16;

/// Byte ranges where two equally long buffers differ.
fn changed_ranges(original: &[u8], rewritten: &[u8]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (i, (a, b)) in original.iter().zip(rewritten).enumerate() {
        if a == b {
            continue;
        }
        match ranges.last_mut() {
            Some(last) if i - last.end <= MERGE_GAP => last.end = i + 1,
            _ => ranges.push(i..i + 1),
        }
    }
    ranges
}

async fn write_back(io: &dyn RangeIo, original: &[u8], rewritten: &[u8]) -> std::io::Result<()> {
    if original.len() == rewritten.len() {
        for range in changed_ranges(original, rewritten) {
            io.write_at(range.start as u64, &rewritten[range]).await?;
        }
        return Ok(());
    }

    // the parser normalized the layout, so the offsets no longer line up
    io.write_at(0, rewritten).await?;
    io.set_len(rewritten.len() as u64).await
}

/// Strips EXIF, XMP, ICC, IPTC and textual metadata from JPEG, PNG and WebP files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataScrubber;

impl MetadataScrubber {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub async fn scrub(&self, path: &Path) -> Result<ScrubReport, ScrubError> {
        let io = FileRangeIo::new(path);
        self.scrub_with(&io).await
    }

    /// Scrub through any byte-range capability.
    pub async fn scrub_with(&self, io: &dyn RangeIo) -> Result<ScrubReport, ScrubError> {
        let head = io.read_at(0, 12).await?;
        let container = detect(&head).ok_or(ScrubError::UnsupportedFormat)?;

        let len = io.len().await?;
        let original = io.read_at(0, len as usize).await?;

        let (format, neutralized) = match container {
            Container::Jpeg => ("jpeg", jpeg::neutralize(&original)?),
            Container::Png => ("png", png::neutralize(&original)?),
            Container::WebP => ("webp", webp::neutralize(&original)?),
        };

        if neutralized.blocks > 0 {
            write_back(io, &original, &neutralized.bytes).await?;
        }

        let report = ScrubReport {
            format,
            blocks_removed: neutralized.blocks,
        };
        tracing::debug!(
            format = report.format,
            blocks_removed = report.blocks_removed,
            "Metadata scrubbed"
        );
        Ok(report)
    }
}
