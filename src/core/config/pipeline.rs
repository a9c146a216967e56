//! Top-level pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{ConfigError, ConfigValidator};
use super::parallel::ParallelPolicy;
use crate::core::errors::OcrResult;
use crate::evaluation::EvaluationConfig;
use crate::processors::{LineMergeConfig, RewriteRuleSpec};

/// Configuration for [`CccdPipeline`](crate::pipeline::CccdPipeline).
///
/// Every section is optional in JSON; missing sections fall back to the
/// ID-card defaults.
///
/// ```json
/// {
///   "line_merge": { "y_threshold": 15.0, "x_gap_threshold": 60.0 },
///   "evaluation": { "iou_threshold": 0.5 },
///   "parallel": { "batch_threshold": 4 },
///   "structured": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Line clustering thresholds.
    #[serde(default = "LineMergeConfig::cccd")]
    pub line_merge: LineMergeConfig,

    /// Detection scoring settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Batch parallelism.
    #[serde(default)]
    pub parallel: ParallelPolicy,

    /// Replacement rewrite rule table. `None` keeps the built-in Vietnamese rules.
    #[serde(default)]
    pub normalization_rules: Option<Vec<RewriteRuleSpec>>,

    /// Whether to parse lines into a structured record.
    #[serde(default = "PipelineConfig::default_structured")]
    pub structured: bool,
}

impl PipelineConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> OcrResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> OcrResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded pipeline config from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    fn default_structured() -> bool {
        true
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_merge: LineMergeConfig::cccd(),
            evaluation: EvaluationConfig::default(),
            parallel: ParallelPolicy::default(),
            normalization_rules: None,
            structured: Self::default_structured(),
        }
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.line_merge.validate()?;
        self.evaluation.validate()?;
        self.parallel.validate()?;
        if let Some(rules) = &self.normalization_rules {
            if let Some(index) = rules.iter().position(|rule| rule.pattern.is_empty()) {
                return Err(ConfigError::InvalidConfig {
                    message: format!("normalization rule {index} has an empty pattern"),
                });
            }
        }
        Ok(())
    }
}
