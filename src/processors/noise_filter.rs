//! Removal of short OCR artifacts from merged lines.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::TextLine;

/// Short tokens that carry meaning on an ID card and must survive filtering.
pub const PRESERVED_LABELS: [&str; 3] = ["Số:", "Nam", "Nữ"];

/// Lines with more than this many characters (after trimming) are always kept.
pub const MIN_TEXT_CHARS: usize = 3;

/// Any Unicode decimal digit, the same class the field extractor reads.
static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("Invalid digit regex"));

/// Drops stray punctuation and partial glyphs while keeping labels and numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseFilter;

impl NoiseFilter {
    /// Creates the filter.
    pub fn new() -> Self {
        Self
    }

    /// Returns whether a line's text is worth keeping.
    ///
    /// A line is kept when its trimmed text is longer than
    /// [`MIN_TEXT_CHARS`] characters, equals one of [`PRESERVED_LABELS`], or
    /// contains a decimal digit.
    pub fn keeps(&self, text: &str) -> bool {
        let text = text.trim();
        text.chars().count() > MIN_TEXT_CHARS
            || PRESERVED_LABELS.contains(&text)
            || DIGIT_REGEX.is_match(text)
    }

    /// Filters lines, preserving their order and `line_id`s.
    pub fn filter(&self, lines: Vec<TextLine>) -> Vec<TextLine> {
        let before = lines.len();
        let kept: Vec<TextLine> = lines.into_iter().filter(|l| self.keeps(&l.text)).collect();
        if kept.len() < before {
            tracing::debug!("Dropped {} noise lines", before - kept.len());
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::BoundingBox;

    fn line(text: &str, line_id: usize) -> TextLine {
        TextLine {
            bounding_box: BoundingBox::new(0, 0, 10, 10),
            text: text.to_string(),
            line_id,
        }
    }

    #[test]
    fn test_keeps_long_text_labels_and_digits() {
        let filter = NoiseFilter::new();
        assert!(filter.keeps("Quê quán"));
        assert!(filter.keeps("Nam"));
        assert!(filter.keeps(" Nữ "));
        assert!(filter.keeps("Số:"));
        assert!(filter.keeps("7"));
        assert!(filter.keeps("a1"));
    }

    #[test]
    fn test_drops_short_fragments() {
        let filter = NoiseFilter::new();
        assert!(!filter.keeps(""));
        assert!(!filter.keeps("."));
        assert!(!filter.keeps(" ,; "));
        assert!(!filter.keeps("abc"));
        assert!(!filter.keeps("nam"));
    }

    #[test]
    fn test_keeps_non_ascii_decimal_digits() {
        let filter = NoiseFilter::new();
        // Arabic-Indic three and a fullwidth seven.
        assert!(filter.keeps("٣"));
        assert!(filter.keeps("７"));
        // Numeric but not a decimal digit.
        assert!(!filter.keeps("½"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Four characters but more than four bytes.
        assert!(NoiseFilter::new().keeps("Việt"));
        // Three characters, six bytes.
        assert!(!NoiseFilter::new().keeps("ỆỆỆ"));
    }

    #[test]
    fn test_filter_preserves_order_and_ids() {
        let kept = NoiseFilter::new().filter(vec![
            line("CĂN CƯỚC CÔNG DÂN", 0),
            line("|", 1),
            line("Nữ", 2),
        ]);
        let ids: Vec<usize> = kept.iter().map(|l| l.line_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
