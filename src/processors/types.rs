//! Value types passed between post-processing stages.

use serde::{Deserialize, Serialize};

use super::geometry::BoundingBox;
use crate::core::errors::{OCRError, OcrResult};

/// One recognized text fragment as produced by the recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Location of the fragment.
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    /// Recognized text.
    pub text: String,
    /// Recognition confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f32,
}

impl TextBox {
    /// Creates a new text fragment.
    pub fn new(bounding_box: BoundingBox, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bounding_box,
            text: text.into(),
            confidence,
        }
    }
}

/// A cluster of fragments judged to lie on the same visual row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Union of the member boxes.
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    /// Member texts, left to right, joined by a single space.
    pub text: String,
    /// Rank of the line in merge order.
    pub line_id: usize,
}

/// Raw output of a recognition engine for one image, as parallel sequences.
///
/// This mirrors the shape most engine adapters return
/// (`{"boxes": [...], "texts": [...], "confidences": [...]}`).
/// `confidences` may be omitted, in which case every fragment gets `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionOutput {
    /// Fragment boxes.
    pub boxes: Vec<BoundingBox>,
    /// Fragment texts, index-aligned with `boxes`.
    pub texts: Vec<String>,
    /// Fragment confidences, index-aligned with `boxes` when present.
    #[serde(default)]
    pub confidences: Vec<f32>,
}

impl RecognitionOutput {
    /// Zips the parallel sequences into fragments.
    ///
    /// Fails with [`OCRError::InputMismatch`] when `boxes` and `texts` differ in
    /// length, or when confidences are present but not aligned with the boxes.
    pub fn into_text_boxes(self) -> OcrResult<Vec<TextBox>> {
        if self.boxes.len() != self.texts.len() {
            return Err(OCRError::InputMismatch {
                boxes: self.boxes.len(),
                texts: self.texts.len(),
            });
        }
        if !self.confidences.is_empty() && self.confidences.len() != self.boxes.len() {
            return Err(OCRError::InvalidInput {
                message: format!(
                    "{} confidences supplied for {} boxes",
                    self.confidences.len(),
                    self.boxes.len()
                ),
            });
        }

        let mut confidences = self.confidences.into_iter();
        Ok(self
            .boxes
            .into_iter()
            .zip(self.texts)
            .map(|(bounding_box, text)| TextBox {
                bounding_box,
                text,
                confidence: confidences.next().unwrap_or(0.0),
            })
            .collect())
    }
}

/// Sorts fragments top to bottom, then left to right, by their top-left corner.
///
/// The sort is stable, so fragments sharing a corner keep their input order.
pub fn sort_reading_order(items: &mut [TextBox]) {
    items.sort_by_key(|item| (item.bounding_box.y, item.bounding_box.x));
}

/// Joins fragment texts with newlines, the plain-text form used when no
/// line merging is performed.
pub fn joined_text(items: &[TextBox]) -> String {
    items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
