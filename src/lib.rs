//! # CCCD OCR
//!
//! Post-processing and evaluation for OCR results on Vietnamese citizen
//! identity cards (Căn cước công dân, CCCD).
//!
//! A recognition engine produces an unordered bag of text fragments with
//! bounding boxes. This crate turns that bag into reading-order lines, cleans
//! up recurring recognition mistakes, reads the card's fields into a
//! structured record, and scores detection and recognition quality against
//! ground truth.
//!
//! ## Features
//!
//! - Line merging by vertical alignment and horizontal proximity
//! - Noise filtering that keeps short labels and numbers
//! - Rule-table text normalization, replaceable from configuration
//! - Precedence-ordered field extraction
//! - Greedy IoU detection scoring and Levenshtein text scoring
//! - Parallel batch processing
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration and collaborator traits
//! * [`processors`] - Geometry, line merging, noise filtering, normalization
//! * [`domain`] - The CCCD record and field extractor
//! * [`evaluation`] - Detection and text scoring
//! * [`pipeline`] - The end-to-end pipeline and its results
//! * [`utils`] - Image metadata and logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use cccd_ocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = CccdPipeline::builder().build()?;
//!
//! let boxes = [
//!     BoundingBox::new(20, 40, 60, 20),
//!     BoundingBox::new(90, 41, 180, 20),
//!     BoundingBox::new(20, 90, 240, 20),
//! ];
//! let texts = ["So:", "001234567890", "Họ và tên: NGUYỄN VĂN A"];
//!
//! let output = pipeline.process(&boxes, &texts)?;
//! assert_eq!(output.structured.id_number, "001234567890");
//! assert_eq!(output.structured.name, "NGUYỄN VĂN A");
//! assert_eq!(output.full_text, "Số: 001234567890\nHọ và tên: NGUYỄN VĂN A");
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod domain;
pub mod evaluation;

pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use cccd_ocr::prelude::*;
/// ```
///
/// Included items cover the common path: building a pipeline, feeding it
/// fragments, reading results and scoring them. For individual stages, import
/// from [`processors`](crate::processors) and [`domain`](crate::domain).
pub mod prelude {
    pub use crate::pipeline::{CccdOutput, CccdPipeline, CccdPipelineBuilder, OcrReport};

    pub use crate::core::{OCRError, OcrResult, PipelineConfig, TextRecognizer};

    pub use crate::domain::{CccdField, CccdRecord};
    pub use crate::evaluation::{EvaluationConfig, EvaluationMetrics, GroundTruth};
    pub use crate::processors::{BoundingBox, TextBox, TextLine};
}
