//! The CCCD post-processing pipeline and its builder.

use image::RgbImage;
use rayon::prelude::*;

use super::result::{CccdOutput, ImageDimensions, LayoutSummary, OcrReport};
use crate::core::config::{ConfigValidator, ParallelPolicy, PipelineConfig};
use crate::core::errors::{OCRError, OcrResult};
use crate::core::traits::TextRecognizer;
use crate::domain::FieldExtractor;
use crate::evaluation::EvaluationConfig;
use crate::processors::{
    BoundingBox, LineMergeConfig, LineMerger, NoiseFilter, TextBox, TextLine, TextNormalizer,
    joined_text, sort_reading_order,
};

/// Builder for [`CccdPipeline`].
///
/// Every setting is optional. Unset settings fall back to the ID-card
/// defaults: 15px / 60px line merging, the built-in Vietnamese rewrite rules,
/// an IoU threshold of 0.5 and structured parsing on.
///
/// # Example
///
/// ```rust
/// use cccd_ocr::pipeline::CccdPipelineBuilder;
/// use cccd_ocr::processors::{BoundingBox, LineMergeConfig};
///
/// let pipeline = CccdPipelineBuilder::new()
///     .line_merge(LineMergeConfig::cccd().with_x_gap_threshold(80.0))
///     .build()
///     .expect("valid configuration");
///
/// let output = pipeline
///     .process(&[BoundingBox::new(10, 10, 200, 20)], &["Giới tính: Nữ"])
///     .unwrap();
/// assert_eq!(output.structured.gender, "Nữ");
/// ```
#[derive(Debug, Default)]
pub struct CccdPipelineBuilder {
    line_merge: Option<LineMergeConfig>,
    normalizer: Option<TextNormalizer>,
    evaluation: Option<EvaluationConfig>,
    parallel: Option<ParallelPolicy>,
    structured: Option<bool>,
}

impl CccdPipelineBuilder {
    /// Creates a builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the line clustering thresholds.
    pub fn line_merge(mut self, config: LineMergeConfig) -> Self {
        self.line_merge = Some(config);
        self
    }

    /// Replaces the rewrite rule table.
    pub fn normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Sets the detection scoring settings used by reports.
    pub fn evaluation(mut self, config: EvaluationConfig) -> Self {
        self.evaluation = Some(config);
        self
    }

    /// Sets the batch parallelism policy.
    pub fn parallel(mut self, policy: ParallelPolicy) -> Self {
        self.parallel = Some(policy);
        self
    }

    /// Enables or disables structured parsing in reports.
    pub fn structured(mut self, enable: bool) -> Self {
        self.structured = Some(enable);
        self
    }

    /// Validates the settings and builds the pipeline.
    pub fn build(self) -> OcrResult<CccdPipeline> {
        let line_merge = self.line_merge.unwrap_or_else(LineMergeConfig::cccd);
        let evaluation = self.evaluation.unwrap_or_default();
        let parallel = self.parallel.unwrap_or_default();
        line_merge.validate()?;
        evaluation.validate()?;
        parallel.validate()?;

        Ok(CccdPipeline {
            merger: LineMerger::new(line_merge),
            noise_filter: NoiseFilter::new(),
            normalizer: self.normalizer.unwrap_or_default(),
            extractor: FieldExtractor::new(),
            evaluation,
            parallel,
            structured: self.structured.unwrap_or(true),
        })
    }
}

/// Turns recognized fragments into merged lines, cleaned text and a card
/// record.
///
/// Stages run in this order: line merging, noise filtering, per-line
/// normalization, field extraction. The pipeline holds no mutable state and
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct CccdPipeline {
    merger: LineMerger,
    noise_filter: NoiseFilter,
    normalizer: TextNormalizer,
    extractor: FieldExtractor,
    evaluation: EvaluationConfig,
    parallel: ParallelPolicy,
    structured: bool,
}

impl CccdPipeline {
    /// Returns a builder.
    pub fn builder() -> CccdPipelineBuilder {
        CccdPipelineBuilder::new()
    }

    /// Builds a pipeline from a loaded configuration.
    pub fn from_config(config: &PipelineConfig) -> OcrResult<Self> {
        let mut builder = CccdPipelineBuilder::new()
            .line_merge(config.line_merge)
            .evaluation(config.evaluation.clone())
            .parallel(config.parallel.clone())
            .structured(config.structured);
        if let Some(specs) = &config.normalization_rules {
            builder = builder.normalizer(TextNormalizer::from_specs(specs)?);
        }
        builder.build()
    }

    /// The detection scoring settings.
    pub fn evaluation_config(&self) -> &EvaluationConfig {
        &self.evaluation
    }

    /// Whether reports carry a structured record.
    pub fn is_structured(&self) -> bool {
        self.structured
    }

    /// Processes parallel box and text sequences.
    ///
    /// Fails with [`OCRError::InputMismatch`] when the lengths differ.
    pub fn process<S: AsRef<str>>(
        &self,
        boxes: &[BoundingBox],
        texts: &[S],
    ) -> OcrResult<CccdOutput> {
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
        Ok(self.process_text_boxes(&items))
    }

    /// Processes one set of fragments. Empty input yields an empty output.
    pub fn process_text_boxes(&self, items: &[TextBox]) -> CccdOutput {
        let lines = self.merger.merge(items);
        let merged_lines = self.noise_filter.filter(lines);
        let normalized: Vec<String> = merged_lines
            .iter()
            .map(|line| self.normalizer.normalize(&line.text))
            .collect();

        let structured = self.extractor.extract(&normalized);
        let full_text = normalized.join("\n");

        CccdOutput {
            structured,
            merged_lines,
            full_text,
        }
    }

    /// Processes independent fragment sets, in parallel when the batch is
    /// larger than the policy's threshold. Output order matches input order.
    pub fn process_batch(&self, batch: &[Vec<TextBox>]) -> Vec<CccdOutput> {
        if self.parallel.should_parallelize(batch.len()) {
            tracing::debug!("Processing {} fragment sets in parallel", batch.len());
            batch
                .par_iter()
                .map(|items| self.process_text_boxes(items))
                .collect()
        } else {
            batch
                .iter()
                .map(|items| self.process_text_boxes(items))
                .collect()
        }
    }

    /// Builds reports for independent recognition results, in parallel when
    /// the batch is larger than the policy's threshold. Output order matches
    /// input order.
    pub fn report_batch(&self, batch: Vec<(Vec<TextBox>, ImageDimensions)>) -> Vec<OcrReport> {
        if self.parallel.should_parallelize(batch.len()) {
            tracing::debug!("Reporting on {} recognition results in parallel", batch.len());
            batch
                .into_par_iter()
                .map(|(items, dims)| self.report(items, dims))
                .collect()
        } else {
            batch
                .into_iter()
                .map(|(items, dims)| self.report(items, dims))
                .collect()
        }
    }

    /// Builds a report for fragments recognized on an image of the given size.
    ///
    /// Fragments are first put in reading order. With structured parsing on
    /// and at least one fragment, the report carries the pipeline output.
    /// Otherwise it carries the fragments as lines and their newline-joined
    /// text. The layout summary always describes the raw fragments.
    pub fn report(&self, mut items: Vec<TextBox>, image_dimensions: ImageDimensions) -> OcrReport {
        sort_reading_order(&mut items);
        let layout_summary =
            LayoutSummary::from_boxes(items.iter().map(|item| &item.bounding_box), image_dimensions);

        if self.structured && !items.is_empty() {
            let output = self.process_text_boxes(&items);
            return OcrReport {
                structured: Some(output.structured),
                lines: output.merged_lines,
                full_text: output.full_text,
                layout_summary,
                metrics: None,
            };
        }

        let full_text = joined_text(&items);
        let lines = items
            .into_iter()
            .enumerate()
            .map(|(line_id, item)| TextLine {
                bounding_box: item.bounding_box,
                text: item.text,
                line_id,
            })
            .collect();
        OcrReport {
            structured: None,
            lines,
            full_text,
            layout_summary,
            metrics: None,
        }
    }

    /// Runs a recognition engine on an image and post-processes its output.
    pub fn recognize_and_process(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &RgbImage,
    ) -> OcrResult<OcrReport> {
        let items = recognizer.recognize(image)?;
        tracing::info!(
            "{} recognized {} fragments on a {}x{} image",
            recognizer.name(),
            items.len(),
            image.width(),
            image.height()
        );
        Ok(self.report(items, ImageDimensions::new(image.width(), image.height())))
    }
}
