//! Recognition quality: character-level edit distance.

use serde::{Deserialize, Serialize};

/// Character accuracy of a predicted text against ground truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    /// `1 - distance / max(len(gt), len(pred), 1)`, clamped at 0.
    pub char_accuracy: f64,
    pub edit_distance: usize,
}

/// Levenshtein distance over Unicode scalar values with unit costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Scores recognized text against ground truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextScorer;

impl TextScorer {
    /// Creates the scorer.
    pub fn new() -> Self {
        Self
    }

    /// Computes text metrics. An empty ground truth or prediction scores zero.
    pub fn score(&self, gt: &str, pred: &str) -> TextMetrics {
        if gt.is_empty() || pred.is_empty() {
            return TextMetrics::default();
        }

        let edit_distance = levenshtein(gt, pred);
        let longest = gt.chars().count().max(pred.chars().count()).max(1);
        let char_accuracy = (1.0 - edit_distance as f64 / longest as f64).max(0.0);

        tracing::debug!(
            "Edit distance {} over {} characters",
            edit_distance,
            longest
        );

        TextMetrics {
            char_accuracy,
            edit_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("Nguyễn", "Nguyễn"), 0);
    }

    #[test]
    fn test_levenshtein_counts_characters() {
        // One substitution even though both are multi-byte.
        assert_eq!(levenshtein("Nữ", "Nứ"), 1);
        assert_eq!(levenshtein("Việt", "Viet"), 1);
    }

    #[test]
    fn test_identical_text_is_fully_accurate() {
        let metrics = TextScorer::new().score("Số: 001234567890", "Số: 001234567890");
        assert_eq!(metrics.char_accuracy, 1.0);
        assert_eq!(metrics.edit_distance, 0);
    }

    #[test]
    fn test_char_accuracy() {
        let metrics = TextScorer::new().score("abcd", "abed");
        assert_eq!(metrics.edit_distance, 1);
        assert!((metrics.char_accuracy - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_uses_longer_text() {
        let metrics = TextScorer::new().score("ab", "abcdefgh");
        assert_eq!(metrics.edit_distance, 6);
        assert!((metrics.char_accuracy - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_side_scores_zero() {
        assert_eq!(TextScorer::new().score("", "abc"), TextMetrics::default());
        assert_eq!(TextScorer::new().score("abc", ""), TextMetrics::default());
    }
}
