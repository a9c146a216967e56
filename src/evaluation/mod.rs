//! Scoring of OCR output against ground truth.
//!
//! Detection and recognition are scored independently: [`DetectionScorer`]
//! matches boxes, [`TextScorer`] compares full texts. [`evaluate`] runs both
//! and merges the results into one flat [`EvaluationMetrics`] record.

pub mod detection;
pub mod text;

pub use detection::{BoxMatch, DetectionMetrics, DetectionScorer};
pub use text::{TextMetrics, TextScorer, levenshtein};

use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator};
use crate::processors::BoundingBox;

/// Settings for detection scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum IoU for a predicted box to match a ground-truth box.
    #[serde(default = "EvaluationConfig::default_iou_threshold")]
    pub iou_threshold: f64,
}

impl EvaluationConfig {
    /// Set the IoU threshold.
    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    fn default_iou_threshold() -> f64 {
        0.5
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            iou_threshold: Self::default_iou_threshold(),
        }
    }
}

impl ConfigValidator for EvaluationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_unit_interval("iou_threshold", self.iou_threshold)
    }
}

/// Ground truth for one image. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
    #[serde(default)]
    pub text: Option<String>,
}

impl GroundTruth {
    /// Whether there is anything to score against.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.text.as_deref().is_none_or(str::is_empty)
    }
}

/// Detection and text metrics side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub precision: f64,
    pub recall: f64,
    pub hmean: f64,
    pub iou_average: f64,
    pub char_accuracy: f64,
    pub edit_distance: usize,
}

impl EvaluationMetrics {
    /// Combines the two halves.
    pub fn new(detection: DetectionMetrics, text: TextMetrics) -> Self {
        Self {
            precision: detection.precision,
            recall: detection.recall,
            hmean: detection.hmean,
            iou_average: detection.iou_average,
            char_accuracy: text.char_accuracy,
            edit_distance: text.edit_distance,
        }
    }

    /// The detection half.
    pub fn detection(&self) -> DetectionMetrics {
        DetectionMetrics {
            precision: self.precision,
            recall: self.recall,
            hmean: self.hmean,
            iou_average: self.iou_average,
        }
    }

    /// The text half.
    pub fn text(&self) -> TextMetrics {
        TextMetrics {
            char_accuracy: self.char_accuracy,
            edit_distance: self.edit_distance,
        }
    }
}

/// Scores predicted boxes and text against ground truth.
///
/// Missing ground-truth text or boxes leave the corresponding metrics at zero.
pub fn evaluate(
    gt: &GroundTruth,
    pred_boxes: &[BoundingBox],
    pred_text: &str,
    config: &EvaluationConfig,
) -> EvaluationMetrics {
    let detection = DetectionScorer::from_config(config).score(&gt.boxes, pred_boxes);
    let text = TextScorer::new().score(gt.text.as_deref().unwrap_or_default(), pred_text);
    EvaluationMetrics::new(detection, text)
}
