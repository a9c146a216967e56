//! Detection quality: greedy IoU matching of predicted boxes to ground truth.

use serde::{Deserialize, Serialize};

use super::EvaluationConfig;
use crate::processors::BoundingBox;

/// Precision, recall and F-score of a box set against ground truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    pub precision: f64,
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub hmean: f64,
    /// Mean IoU over matched pairs.
    pub iou_average: f64,
}

/// A predicted box paired with the ground-truth box it claimed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMatch {
    pub pred_index: usize,
    pub gt_index: usize,
    pub iou: f64,
}

/// Scores predicted boxes against ground truth.
///
/// Predictions are visited in input order. Each claims the not yet matched
/// ground-truth box with the highest IoU, provided that IoU reaches the
/// threshold. Matching is greedy and never revisited, so the result depends on
/// prediction order and can be worse than an optimal assignment.
#[derive(Debug, Clone, Copy)]
pub struct DetectionScorer {
    iou_threshold: f64,
}

impl DetectionScorer {
    /// Creates a scorer with the given IoU threshold.
    pub fn new(iou_threshold: f64) -> Self {
        Self { iou_threshold }
    }

    /// Creates a scorer from an evaluation config.
    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self::new(config.iou_threshold)
    }

    /// The IoU a match must reach.
    pub fn iou_threshold(&self) -> f64 {
        self.iou_threshold
    }

    /// Performs the greedy matching.
    pub fn match_boxes(&self, gt: &[BoundingBox], pred: &[BoundingBox]) -> Vec<BoxMatch> {
        let mut matched = vec![false; gt.len()];
        let mut matches = Vec::new();

        for (pred_index, pred_box) in pred.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (gt_index, gt_box) in gt.iter().enumerate() {
                if matched[gt_index] {
                    continue;
                }
                let iou = pred_box.iou(gt_box);
                if iou > best.map_or(0.0, |(_, best_iou)| best_iou) {
                    best = Some((gt_index, iou));
                }
            }

            if let Some((gt_index, iou)) = best {
                if iou >= self.iou_threshold {
                    matched[gt_index] = true;
                    matches.push(BoxMatch {
                        pred_index,
                        gt_index,
                        iou,
                    });
                }
            }
        }
        matches
    }

    /// Computes detection metrics. Empty ground truth scores all zeros.
    pub fn score(&self, gt: &[BoundingBox], pred: &[BoundingBox]) -> DetectionMetrics {
        if gt.is_empty() {
            return DetectionMetrics::default();
        }

        let matches = self.match_boxes(gt, pred);
        let tp = matches.len();
        let fp = pred.len() - tp;
        let fn_ = gt.len() - tp;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let hmean = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        let iou_average = if tp > 0 {
            matches.iter().map(|m| m.iou).sum::<f64>() / tp as f64
        } else {
            0.0
        };

        tracing::debug!(
            "Matched {} of {} predicted boxes against {} ground-truth boxes",
            tp,
            pred.len(),
            gt.len()
        );

        DetectionMetrics {
            precision,
            recall,
            hmean,
            iou_average,
        }
    }
}

impl Default for DetectionScorer {
    fn default() -> Self {
        Self::from_config(&EvaluationConfig::default())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
