//! Sharehost upload processing
//!
//! Derived artifacts for a freshly stored upload: WebP previews, metadata
//! scrubbing, dominant color and resolution, plus the [`UploadPipeline`]
//! that sequences them and persists the resulting record.

pub mod color;
pub mod preview;
pub mod resolution;
pub mod scrub;
pub mod timestamp;
pub mod upload;

pub use color::{ColorError, ColorExtractor};
pub use preview::{PreviewError, PreviewGenerator};
pub use resolution::{FfprobeVideoProbe, ProbeError, ResolutionProber, VideoProbe};
pub use scrub::{FileRangeIo, MetadataScrubber, RangeIo, ScrubError, ScrubReport};
pub use upload::{UploadOutcome, UploadPipeline, UploadStage};
