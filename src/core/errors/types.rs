//! Core error types for the post-processing pipeline.
//!
//! This module defines the fundamental error types used throughout the crate,
//! including the main OCRError enum and the ProcessingStage enum that tags
//! which pipeline stage produced a failure.

use thiserror::Error;

/// Enum representing the stages of the post-processing pipeline.
///
/// This enum is used to identify which stage an error occurred in,
/// providing context for debugging and error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred while the external engine was recognizing text.
    Recognition,
    /// Error occurred while building the rewrite rule table.
    Normalization,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Recognition => write!(f, "recognition"),
            ProcessingStage::Normalization => write!(f, "normalization"),
        }
    }
}

/// Enum representing the errors that can occur in the pipeline.
///
/// Normal degenerate inputs (empty box lists, missing ground truth, lines that
/// match no field) are not errors; they produce empty or zeroed results.
/// The variants below cover malformed input, configuration problems and
/// failures reported by collaborators.
#[derive(Error, Debug)]
pub enum OCRError {
    /// A raw rectangle had a negative or out-of-range dimension.
    #[error("invalid box [{x}, {y}, {width}, {height}]: width and height must be non-negative")]
    InvalidBox {
        /// Left edge as supplied.
        x: i64,
        /// Top edge as supplied.
        y: i64,
        /// Width as supplied.
        width: i64,
        /// Height as supplied.
        height: i64,
    },

    /// Parallel box and text sequences did not have the same length.
    #[error("input mismatch: {boxes} boxes but {texts} texts")]
    InputMismatch {
        /// Number of boxes supplied.
        boxes: usize,
        /// Number of texts supplied.
        texts: usize,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while reading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

impl From<crate::core::config::ConfigError> for OCRError {
    /// Converts a ConfigError to OCRError::ConfigError.
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<image::ImageError> for OCRError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl OCRError {
    /// Wraps an error reported by an external recognition engine.
    pub fn recognition_error(
        engine: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::Recognition,
            context: format!("engine '{}'", engine.into()),
            source: Box::new(source),
        }
    }

    /// Wraps a rewrite rule whose pattern failed to compile.
    pub fn invalid_rule(index: usize, pattern: &str, source: regex::Error) -> Self {
        Self::Processing {
            kind: ProcessingStage::Normalization,
            context: format!("rule {index} has an invalid pattern '{pattern}'"),
            source: Box::new(source),
        }
    }
}
