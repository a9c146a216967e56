//! Result types for the CCCD pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{CccdField, CccdRecord};
use crate::evaluation::{EvaluationConfig, EvaluationMetrics, GroundTruth, evaluate};
use crate::processors::{BoundingBox, TextLine};

/// Output of post-processing one set of recognized fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CccdOutput {
    /// Fields read off the card.
    pub structured: CccdRecord,
    /// Lines that survived noise filtering, with their merged (not yet
    /// normalized) text.
    pub merged_lines: Vec<TextLine>,
    /// Normalized line texts joined by newlines.
    pub full_text: String,
}

/// Width and height of the source image in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// How much of the image the recognized fragments cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub num_text_boxes: usize,
    /// Total fragment area over image area, in percent, two decimals.
    pub text_density_percent: f64,
    /// Mean fragment area, two decimals.
    pub avg_box_size: f64,
    pub image_dimensions: ImageDimensions,
}

impl LayoutSummary {
    /// Summarizes fragment boxes over an image.
    ///
    /// Density is 0 for an empty image, average size is 0 with no boxes.
    pub fn from_boxes<'a>(
        boxes: impl IntoIterator<Item = &'a BoundingBox>,
        image_dimensions: ImageDimensions,
    ) -> Self {
        let (num_text_boxes, text_area) = boxes
            .into_iter()
            .fold((0usize, 0u64), |(count, area), b| (count + 1, area + b.area()));

        let image_area = image_dimensions.area();
        let text_density_percent = if image_area > 0 {
            round2(text_area as f64 / image_area as f64 * 100.0)
        } else {
            0.0
        };
        let avg_box_size = if num_text_boxes > 0 {
            round2(text_area as f64 / num_text_boxes as f64)
        } else {
            0.0
        };

        Self {
            num_text_boxes,
            text_density_percent,
            avg_box_size,
            image_dimensions,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Everything known about one processed image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrReport {
    /// Parsed record, absent when structured parsing was off or nothing was
    /// recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<CccdRecord>,
    /// Merged lines in structured mode, raw fragments otherwise.
    pub lines: Vec<TextLine>,
    pub full_text: String,
    pub layout_summary: LayoutSummary,
    /// Scores against ground truth, when any was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<EvaluationMetrics>,
}

impl OcrReport {
    /// Line boxes, as scored against ground-truth boxes.
    pub fn predicted_boxes(&self) -> Vec<BoundingBox> {
        self.lines.iter().map(|line| line.bounding_box).collect()
    }

    /// Line texts joined by spaces, as scored against ground-truth text.
    pub fn predicted_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Scores the report against ground truth and stores the result.
    ///
    /// Does nothing and returns `None` when the ground truth is empty.
    pub fn evaluate(
        &mut self,
        gt: &GroundTruth,
        config: &EvaluationConfig,
    ) -> Option<EvaluationMetrics> {
        if gt.is_empty() {
            return None;
        }
        let metrics = evaluate(gt, &self.predicted_boxes(), &self.predicted_text(), config);
        self.metrics = Some(metrics);
        self.metrics
    }
}

impl fmt::Display for OcrReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = self.layout_summary.image_dimensions;
        writeln!(f, "Image dimensions: [{}, {}]", dims.width, dims.height)?;
        writeln!(f, "Text boxes: {}", self.layout_summary.num_text_boxes)?;
        writeln!(
            f,
            "Text density: {:.2}%",
            self.layout_summary.text_density_percent
        )?;

        writeln!(f, "Lines: {}", self.lines.len())?;
        for line in &self.lines {
            let b = line.bounding_box;
            writeln!(
                f,
                "  Line {}: [{}, {}, {}, {}] -> '{}'",
                line.line_id, b.x, b.y, b.width, b.height, line.text
            )?;
        }

        if let Some(record) = &self.structured {
            writeln!(f, "Fields:")?;
            for field in CccdField::ALL {
                let value = record.get(field);
                if value.is_empty() {
                    writeln!(f, "  {field}: -")?;
                } else {
                    writeln!(f, "  {field}: {value}")?;
                }
            }
        }

        if let Some(metrics) = &self.metrics {
            writeln!(
                f,
                "Detection: precision {:.3}, recall {:.3}, hmean {:.3}, mean IoU {:.3}",
                metrics.precision, metrics.recall, metrics.hmean, metrics.iou_average
            )?;
            writeln!(
                f,
                "Text: char accuracy {:.3}, edit distance {}",
                metrics.char_accuracy, metrics.edit_distance
            )?;
        }
        Ok(())
    }
}
