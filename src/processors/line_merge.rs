//! Clustering of recognized fragments into reading-order lines.
//!
//! Fragments are sorted by their top-left corner and scanned once. A fragment
//! joins the open line when it is vertically aligned with, and horizontally
//! close to, the fragment added to that line just before it. Comparing against
//! the last member rather than the line's running box keeps the decision
//! local: a long line can drift slowly in `y` without ever being split.

use serde::{Deserialize, Serialize};

use super::geometry::BoundingBox;
use super::types::{TextBox, TextLine};
use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::errors::{OCRError, OcrResult};

/// Thresholds for [`LineMerger`], in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineMergeConfig {
    /// Maximum difference between vertical centers for two fragments to share a line.
    #[serde(default = "LineMergeConfig::cccd_y_threshold")]
    pub y_threshold: f64,
    /// Maximum gap between the previous fragment's right edge and the next
    /// fragment's left edge.
    #[serde(default = "LineMergeConfig::cccd_x_gap_threshold")]
    pub x_gap_threshold: f64,
}

impl LineMergeConfig {
    /// Creates a configuration with explicit thresholds.
    pub fn new(y_threshold: f64, x_gap_threshold: f64) -> Self {
        Self {
            y_threshold,
            x_gap_threshold,
        }
    }

    /// Thresholds tuned for ID card scans (15px / 60px).
    pub fn cccd() -> Self {
        Self::new(Self::cccd_y_threshold(), Self::cccd_x_gap_threshold())
    }

    /// Set the vertical center threshold.
    pub fn with_y_threshold(mut self, y_threshold: f64) -> Self {
        self.y_threshold = y_threshold;
        self
    }

    /// Set the horizontal gap threshold.
    pub fn with_x_gap_threshold(mut self, x_gap_threshold: f64) -> Self {
        self.x_gap_threshold = x_gap_threshold;
        self
    }

    fn cccd_y_threshold() -> f64 {
        15.0
    }

    fn cccd_x_gap_threshold() -> f64 {
        60.0
    }
}

impl Default for LineMergeConfig {
    /// General-purpose thresholds (10px / 50px).
    fn default() -> Self {
        Self::new(10.0, 50.0)
    }
}

impl ConfigValidator for LineMergeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive("y_threshold", self.y_threshold)?;
        self.validate_positive("x_gap_threshold", self.x_gap_threshold)
    }
}

/// Groups fragments into lines.
#[derive(Debug, Clone, Default)]
pub struct LineMerger {
    config: LineMergeConfig,
}

impl LineMerger {
    /// Creates a merger with the given thresholds.
    pub fn new(config: LineMergeConfig) -> Self {
        Self { config }
    }

    /// Returns the active thresholds.
    pub fn config(&self) -> &LineMergeConfig {
        &self.config
    }

    /// Merges fragments into lines, top to bottom.
    ///
    /// Each line's text is the trimmed member texts, ordered by `x`, joined with
    /// a single space. `line_id` is the position of the line in the output.
    /// Empty input yields no lines.
    pub fn merge(&self, items: &[TextBox]) -> Vec<TextLine> {
        let groups = self.group_indices(items);
        let lines: Vec<TextLine> = groups
            .iter()
            .enumerate()
            .filter_map(|(line_id, members)| {
                let bounding_box =
                    BoundingBox::enclosing(members.iter().map(|&i| &items[i].bounding_box))?;
                let text = members
                    .iter()
                    .map(|&i| items[i].text.trim())
                    .collect::<Vec<_>>()
                    .join(" ");
                Some(TextLine {
                    bounding_box,
                    text,
                    line_id,
                })
            })
            .collect();

        tracing::debug!("Merged {} fragments into {} lines", items.len(), lines.len());
        lines
    }

    /// Merges parallel `boxes` / `texts` sequences.
    ///
    /// Fails fast with [`OCRError::InputMismatch`] when the lengths differ.
    pub fn merge_parallel<S: AsRef<str>>(
        &self,
        boxes: &[BoundingBox],
        texts: &[S],
    ) -> OcrResult<Vec<TextLine>> {
        if boxes.len() != texts.len() {
            return Err(OCRError::InputMismatch {
                boxes: boxes.len(),
                texts: texts.len(),
            });
        }
        let items: Vec<TextBox> = boxes
            .iter()
            .zip(texts)
            .map(|(bounding_box, text)| TextBox::new(*bounding_box, text.as_ref(), 0.0))
            .collect();
        Ok(self.merge(&items))
    }

    /// Returns, for each line, the input indices of its members ordered left
    /// to right.
    ///
    /// Every input index appears in exactly one group.
    pub fn group_indices(&self, items: &[TextBox]) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by_key(|&i| (items[i].bounding_box.y, items[i].bounding_box.x));

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        for index in order {
            if let Some(&last) = current.last() {
                if !self.joins(&items[last].bounding_box, &items[index].bounding_box) {
                    groups.push(std::mem::take(&mut current));
                }
            }
            current.push(index);
        }
        if !current.is_empty() {
            groups.push(current);
        }

        for group in &mut groups {
            group.sort_by_key(|&i| items[i].bounding_box.x);
        }
        groups
    }

    fn joins(&self, last: &BoundingBox, next: &BoundingBox) -> bool {
        let y_diff = (next.center_y() - last.center_y()).abs();
        let x_gap = (next.x_min() - last.x_max()) as f64;
        y_diff < self.config.y_threshold && x_gap < self.config.x_gap_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(x: i32, y: i32, w: u32, h: u32, text: &str) -> TextBox {
        TextBox::new(BoundingBox::new(x, y, w, h), text, 0.9)
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        let merger = LineMerger::new(LineMergeConfig::cccd());
        assert!(merger.merge(&[]).is_empty());
    }

    #[test]
    fn test_same_row_fragments_merge_left_to_right() {
        let merger = LineMerger::new(LineMergeConfig::cccd());
        let items = vec![
            item(120, 52, 80, 20, "Văn A"),
            item(10, 50, 100, 20, "Nguyễn"),
        ];
        let lines = merger.merge(&items);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Nguyễn Văn A");
        assert_eq!(lines[0].bounding_box, BoundingBox::new(10, 50, 190, 22));
        assert_eq!(lines[0].line_id, 0);
    }

    #[test]
    fn test_gap_boundary() {
        let config = LineMergeConfig::cccd();
        let merger = LineMerger::new(config);
        let gap = config.x_gap_threshold as i32;

        let just_inside = vec![item(0, 0, 10, 10, "a"), item(10 + gap - 1, 0, 10, 10, "b")];
        assert_eq!(merger.merge(&just_inside).len(), 1);

        let at_threshold = vec![item(0, 0, 10, 10, "a"), item(10 + gap, 0, 10, 10, "b")];
        assert_eq!(merger.merge(&at_threshold).len(), 2);
    }

    #[test]
    fn test_vertical_threshold_splits_rows() {
        let merger = LineMerger::new(LineMergeConfig::cccd());
        let items = vec![item(0, 0, 50, 20, "top"), item(60, 15, 50, 20, "bottom")];
        let lines = merger.merge(&items);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "top");
        assert_eq!(lines[1].text, "bottom");
        assert_eq!(lines[1].line_id, 1);
    }

    #[test]
    fn test_compares_against_last_member_only() {
        // Each step drifts 10px, under the 15px threshold, so the chain stays
        // one line even though the first and last centers are 20px apart.
        let merger = LineMerger::new(LineMergeConfig::cccd());
        let items = vec![
            item(0, 0, 20, 20, "a"),
            item(30, 10, 20, 20, "b"),
            item(60, 20, 20, 20, "c"),
        ];
        let lines = merger.merge(&items);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "a b c");
    }

    #[test]
    fn test_texts_are_trimmed_before_joining() {
        let merger = LineMerger::default();
        let items = vec![item(0, 0, 10, 10, "  Số: "), item(20, 0, 10, 10, " 0123 ")];
        assert_eq!(merger.merge(&items)[0].text, "Số: 0123");
    }

    #[test]
    fn test_groups_partition_input() {
        let merger = LineMerger::new(LineMergeConfig::cccd());
        let items = vec![
            item(300, 200, 40, 20, "f"),
            item(0, 0, 40, 20, "a"),
            item(50, 2, 40, 20, "b"),
            item(500, 0, 40, 20, "c"),
            item(0, 100, 40, 20, "d"),
            item(45, 101, 40, 20, "e"),
        ];
        let groups = merger.group_indices(&items);
        assert!(groups.len() <= items.len());

        let mut seen: Vec<usize> = groups.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
        // "a" closes before "c" (gap too wide); "b" sorts after "c" by its top
        // edge and joins it because the gap to "c" is negative.
        assert_eq!(groups, vec![vec![1], vec![2, 3], vec![4, 5], vec![0]]);
    }

    #[test]
    fn test_merge_parallel_rejects_mismatch() {
        let merger = LineMerger::default();
        let boxes = [BoundingBox::new(0, 0, 1, 1)];
        let texts: [&str; 2] = ["a", "b"];
        let err = merger.merge_parallel(&boxes, &texts).unwrap_err();
        assert!(matches!(err, OCRError::InputMismatch { boxes: 1, texts: 2 }));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert!(LineMergeConfig::new(0.0, 60.0).validate().is_err());
        assert!(LineMergeConfig::cccd().validate().is_ok());
    }
}
