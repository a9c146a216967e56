//! Error handling for the pipeline.

mod types;

pub use types::{OCRError, ProcessingStage};

/// Crate-wide result type.
pub type OcrResult<T> = Result<T, OCRError>;
