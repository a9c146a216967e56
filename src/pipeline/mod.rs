//! The CCCD pipeline module.
//!
//! This module wires the post-processing stages into one entry point and
//! defines the results it produces.
//!
//! # Main APIs
//!
//! - [`CccdPipelineBuilder`] - For configuring a pipeline
//! - [`CccdPipeline`] - For processing recognized fragments or running an engine
//! - [`OcrReport`] - For per-image results, layout summary and metrics

pub mod ocr;
pub mod result;

pub use ocr::*;
pub use result::*;
