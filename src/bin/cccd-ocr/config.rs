//! Configuration resolution for the CLI.

use cccd_ocr::core::{ConfigValidator, OcrResult, PipelineConfig};
use cccd_ocr::evaluation::GroundTruth;
use cccd_ocr::processors::BoundingBox;
use std::path::Path;
use tracing::{debug, warn};

/// Settings given on the command line or through `CCCD_*` variables.
/// They take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub y_threshold: Option<f64>,
    pub x_gap_threshold: Option<f64>,
    pub iou_threshold: Option<f64>,
    pub max_threads: Option<usize>,
    pub unstructured: bool,
}

/// Loads the configuration file, if any, and applies the overrides.
pub fn resolve_config(path: Option<&Path>, overrides: &CliOverrides) -> OcrResult<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(y_threshold) = overrides.y_threshold {
        config.line_merge = config.line_merge.with_y_threshold(y_threshold);
    }
    if let Some(x_gap_threshold) = overrides.x_gap_threshold {
        config.line_merge = config.line_merge.with_x_gap_threshold(x_gap_threshold);
    }
    if let Some(iou_threshold) = overrides.iou_threshold {
        config.evaluation = config.evaluation.with_iou_threshold(iou_threshold);
    }
    if overrides.max_threads.is_some() {
        config.parallel = config.parallel.with_max_threads(overrides.max_threads);
    }
    if overrides.unstructured {
        config.structured = false;
    }

    config.validate()?;
    debug!("Resolved pipeline config: {:?}", config);
    Ok(config)
}

/// Builds ground truth from the `--gt-text` / `--gt-boxes` flags.
///
/// Boxes are a JSON array of `[x, y, w, h]`. Unparseable boxes are logged and
/// ignored so that text scoring still runs.
pub fn ground_truth_from_flags(text: Option<String>, boxes: Option<&str>) -> GroundTruth {
    let boxes = boxes
        .and_then(|raw| match serde_json::from_str::<Vec<BoundingBox>>(raw) {
            Ok(boxes) => Some(boxes),
            Err(err) => {
                warn!("Ignoring unparseable ground-truth boxes: {}", err);
                None
            }
        })
        .unwrap_or_default();
    GroundTruth { boxes, text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_defaults() {
        let overrides = CliOverrides {
            x_gap_threshold: Some(80.0),
            unstructured: true,
            ..Default::default()
        };
        let config = resolve_config(None, &overrides).unwrap();
        assert_eq!(config.line_merge.y_threshold, 15.0);
        assert_eq!(config.line_merge.x_gap_threshold, 80.0);
        assert!(!config.structured);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = CliOverrides {
            iou_threshold: Some(2.0),
            ..Default::default()
        };
        assert!(resolve_config(None, &overrides).is_err());
    }

    #[test]
    fn test_bad_ground_truth_boxes_are_ignored() {
        let gt = ground_truth_from_flags(Some("Nam".to_string()), Some("not json"));
        assert!(gt.boxes.is_empty());
        assert_eq!(gt.text.as_deref(), Some("Nam"));

        let gt = ground_truth_from_flags(None, Some("[[0, 0, 4, 4]]"));
        assert_eq!(gt.boxes, vec![BoundingBox::new(0, 0, 4, 4)]);
    }
}
