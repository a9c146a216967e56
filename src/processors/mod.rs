//! Post-processing stages applied to recognition output.
//!
//! This module groups the geometric primitives and the per-line stages of the
//! pipeline: merging fragments into lines, dropping noise and rewriting
//! common recognition mistakes.

pub mod geometry;
pub mod line_merge;
pub mod noise_filter;
pub mod normalization;
pub mod types;

pub use geometry::{BoundingBox, IOU_EPSILON, Point, iou};
pub use line_merge::{LineMergeConfig, LineMerger};
pub use noise_filter::{MIN_TEXT_CHARS, NoiseFilter, PRESERVED_LABELS};
pub use normalization::{RewriteRule, RewriteRuleSpec, TextNormalizer, VIETNAMESE_CCCD_RULES};
pub use types::{RecognitionOutput, TextBox, TextLine, joined_text, sort_reading_order};
