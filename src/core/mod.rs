//! The core module of the crate.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration management
//! - Error handling
//! - Traits for external collaborators
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{ConfigError, ConfigValidator, ParallelPolicy, PipelineConfig};
pub use errors::{OCRError, OcrResult, ProcessingStage};
pub use traits::TextRecognizer;
