//! Rule-based cleanup of recognized text.
//!
//! Cleanup is expressed as an ordered table of regex rewrite rules. Each rule
//! runs on the output of the previous one, and the result is trimmed. The
//! built-in table fixes recurring recognition mistakes on Vietnamese ID
//! cards; a different table can be supplied through configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::core::errors::{OCRError, OcrResult};

/// Built-in rewrite rules for Vietnamese ID card text, applied in order.
///
/// Replacements use `regex` syntax (`${1}` for the first capture group).
pub const VIETNAMESE_CCCD_RULES: &[(&str, &str)] = &[
    // "sa." / "So:" misread for the number label
    (r"(?i)\b(?:sa\.|So:)", "Số:"),
    // 199C -> 1990
    (r"(\d{3})C\b", "${1}0"),
    // O9 -> 09, 9O -> 90
    (r"\bO(\d)", "0${1}"),
    (r"(\d)O\b", "${1}0"),
    // l9 -> 19
    (r"\bl(\d)", "1${1}"),
    (r"\s+", " "),
];

static VIETNAMESE_CCCD_TABLE: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    VIETNAMESE_CCCD_RULES
        .iter()
        .map(|(pattern, replacement)| {
            RewriteRule::new(pattern, *replacement).expect("built-in rewrite rules must compile")
        })
        .collect()
});

/// Serializable form of a rewrite rule, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRuleSpec {
    /// Regex pattern.
    pub pattern: String,
    /// Replacement, may reference capture groups.
    pub replacement: String,
}

/// A compiled pattern → replacement pair.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    /// Compiles a rule.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replaces every non-overlapping match in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

/// Applies an ordered rewrite rule table to a line of text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    rules: Vec<RewriteRule>,
}

impl TextNormalizer {
    /// Creates a normalizer from already compiled rules.
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// The built-in Vietnamese ID card rule table.
    pub fn vietnamese_cccd() -> Self {
        Self::new(VIETNAMESE_CCCD_TABLE.clone())
    }

    /// Compiles a rule table from its serializable form.
    pub fn from_specs(specs: &[RewriteRuleSpec]) -> OcrResult<Self> {
        let rules = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                RewriteRule::new(&spec.pattern, spec.replacement.as_str())
                    .map_err(|e| OCRError::invalid_rule(index, &spec.pattern, e))
            })
            .collect::<OcrResult<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Appends a rule to the end of the table.
    pub fn with_rule(mut self, rule: RewriteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules, in application order.
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Runs every rule in order on the result of the previous one, then trims.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        self.rules
            .iter()
            .fold(text.to_owned(), |current, rule| rule.apply(&current).into_owned())
            .trim()
            .to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::vietnamese_cccd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        TextNormalizer::vietnamese_cccd().normalize(text)
    }

    #[test]
    fn test_number_label_fix() {
        assert_eq!(normalize("sa. 001234567890"), "Số: 001234567890");
        assert_eq!(normalize("So: 001234567890"), "Số: 001234567890");
        assert_eq!(normalize("SO: 001234567890"), "Số: 001234567890");
        assert_eq!(normalize("Số: 001234567890"), "Số: 001234567890");
    }

    #[test]
    fn test_year_suffix_fix() {
        assert_eq!(normalize("199C"), "1990");
        assert_eq!(normalize("01/01/203C"), "01/01/2030");
        // Not at a word boundary.
        assert_eq!(normalize("199CD"), "199CD");
    }

    #[test]
    fn test_letter_digit_confusion() {
        assert_eq!(normalize("O9 l9"), "09 19");
        assert_eq!(normalize("9O"), "90");
        assert_eq!(normalize("ngày O1/O2/1990"), "ngày 01/02/1990");
        // "l" inside a word is left alone.
        assert_eq!(normalize("ol9"), "ol9");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize("  Họ và   tên:\tNguyễn  Văn A  "), "Họ và tên: Nguyễn Văn A");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_rules_apply_sequentially() {
        let normalizer = TextNormalizer::new(vec![
            RewriteRule::new(r"a", "b").unwrap(),
            RewriteRule::new(r"b", "c").unwrap(),
        ]);
        assert_eq!(normalizer.normalize("a"), "c");
    }

    #[test]
    fn test_appended_rule_runs_after_built_ins() {
        let normalizer = TextNormalizer::vietnamese_cccd()
            .with_rule(RewriteRule::new(r"Số:", "No.").unwrap());
        assert_eq!(normalizer.rules().len(), VIETNAMESE_CCCD_RULES.len() + 1);
        assert_eq!(normalizer.rules().last().unwrap().pattern(), "Số:");
        // Only matches once the built-in label fix has produced "Số:".
        assert_eq!(normalizer.normalize("So: 001234567890"), "No. 001234567890");
        // Runs after whitespace collapsing, so its own spacing is kept.
        let spaced = TextNormalizer::vietnamese_cccd()
            .with_rule(RewriteRule::new(r"-", " - ").unwrap());
        assert_eq!(spaced.normalize("Hà  Nội-Việt Nam"), "Hà Nội - Việt Nam");
    }

    #[test]
    fn test_custom_rule_table() {
        let specs = vec![RewriteRuleSpec {
            pattern: r"(?i)\bngay\b".to_string(),
            replacement: "Ngày".to_string(),
        }];
        let normalizer = TextNormalizer::from_specs(&specs).unwrap();
        assert_eq!(normalizer.rules().len(), 1);
        assert_eq!(normalizer.normalize("NGAY sinh"), "Ngày sinh");
    }

    #[test]
    fn test_invalid_custom_rule_reports_index() {
        let specs = vec![
            RewriteRuleSpec {
                pattern: "ok".to_string(),
                replacement: String::new(),
            },
            RewriteRuleSpec {
                pattern: "(".to_string(),
                replacement: String::new(),
            },
        ];
        let err = TextNormalizer::from_specs(&specs).unwrap_err();
        assert!(err.to_string().contains("rule 1"));
    }
}
