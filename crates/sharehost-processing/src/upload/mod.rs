mod pipeline;

pub use pipeline::{UploadOutcome, UploadPipeline, UploadStage};
