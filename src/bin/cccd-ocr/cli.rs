//! Subcommand implementations.

use cccd_ocr::core::{OCRError, OcrResult, PipelineConfig};
use cccd_ocr::evaluation::{EvaluationConfig, EvaluationMetrics, GroundTruth, evaluate};
use cccd_ocr::pipeline::{CccdPipeline, ImageDimensions, OcrReport};
use cccd_ocr::processors::{BoundingBox, RecognitionOutput, TextBox};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The full result as JSON.
    Json,
    /// Only the cleaned text.
    Text,
    /// A human-readable summary.
    Pretty,
}

/// A prediction to score with `evaluate`.
#[derive(Debug, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
    #[serde(default)]
    pub text: String,
}

/// Reads a recognition dump into fragments.
fn load_dump(input: &Path) -> OcrResult<Vec<TextBox>> {
    info!("Loading recognition output from {}", input.display());
    let contents = std::fs::read_to_string(input)?;
    let recognition: RecognitionOutput = serde_json::from_str(&contents)?;
    recognition.into_text_boxes()
}

/// Pairs each input with its source image, by position.
///
/// Images are optional, but when given there must be one per input.
pub fn pair_images<'a>(
    inputs: &'a [PathBuf],
    images: &'a [PathBuf],
) -> OcrResult<Vec<(&'a Path, Option<&'a Path>)>> {
    if images.is_empty() {
        return Ok(inputs.iter().map(|input| (input.as_path(), None)).collect());
    }
    if images.len() != inputs.len() {
        return Err(OCRError::InvalidInput {
            message: format!(
                "{} images given for {} inputs; pass one --image per --input",
                images.len(),
                inputs.len()
            ),
        });
    }
    Ok(inputs
        .iter()
        .zip(images)
        .map(|(input, image)| (input.as_path(), Some(image.as_path())))
        .collect())
}

/// Post-processes recognition dumps and prints one report per dump.
///
/// Dumps are reported on in parallel according to the configured policy.
/// Ground truth, when given, is only accepted for a single dump.
pub fn process_files(
    inputs: &[PathBuf],
    images: &[PathBuf],
    config: &PipelineConfig,
    ground_truth: &GroundTruth,
    format: OutputFormat,
) -> OcrResult<()> {
    if inputs.len() > 1 && !ground_truth.is_empty() {
        return Err(OCRError::InvalidInput {
            message: "ground truth can only be given for a single input".to_string(),
        });
    }

    let start = Instant::now();

    let batch = pair_images(inputs, images)?
        .into_iter()
        .map(|(input, image)| {
            let dimensions = match image {
                Some(path) => cccd_ocr::utils::image_dimensions(path)?,
                None => ImageDimensions::default(),
            };
            Ok((load_dump(input)?, dimensions))
        })
        .collect::<OcrResult<Vec<_>>>()?;

    if config.parallel.install_global_thread_pool().is_err() {
        tracing::warn!("Global thread pool already initialized");
    }

    let pipeline = CccdPipeline::from_config(config)?;
    let mut reports = pipeline.report_batch(batch);
    for report in &mut reports {
        report.evaluate(ground_truth, pipeline.evaluation_config());
    }

    let processing_time = start.elapsed();
    info!(
        "Processed {} dumps with {} fragments in {:.2}ms",
        reports.len(),
        reports
            .iter()
            .map(|report| report.layout_summary.num_text_boxes)
            .sum::<usize>(),
        processing_time.as_secs_f64() * 1000.0
    );

    output_reports(&reports, format)
}

/// Scores a prediction file against a ground-truth file and prints the metrics.
pub fn evaluate_files(
    ground_truth: &Path,
    prediction: &Path,
    config: &EvaluationConfig,
    format: OutputFormat,
) -> OcrResult<()> {
    let gt: GroundTruth = serde_json::from_str(&std::fs::read_to_string(ground_truth)?)?;
    let pred: Prediction = serde_json::from_str(&std::fs::read_to_string(prediction)?)?;

    info!(
        "Scoring {} predicted boxes against {} ground-truth boxes",
        pred.boxes.len(),
        gt.boxes.len()
    );
    let metrics = evaluate(&gt, &pred.boxes, &pred.text, config);
    output_metrics(&metrics, format)
}

fn output_reports(reports: &[OcrReport], format: OutputFormat) -> OcrResult<()> {
    match format {
        OutputFormat::Json => match reports {
            [report] => println!("{}", serde_json::to_string_pretty(report)?),
            _ => println!("{}", serde_json::to_string_pretty(reports)?),
        },
        OutputFormat::Text => {
            for report in reports {
                println!("{}", report.full_text);
            }
        }
        OutputFormat::Pretty => {
            for report in reports {
                println!("\n=== CCCD OCR Results ===");
                print!("{report}");
                println!();
                println!("--- Full Text ---");
                println!("{}", report.full_text);
            }
        }
    }
    Ok(())
}

fn output_metrics(metrics: &EvaluationMetrics, format: OutputFormat) -> OcrResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(metrics)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            println!("precision:     {:.4}", metrics.precision);
            println!("recall:        {:.4}", metrics.recall);
            println!("hmean:         {:.4}", metrics.hmean);
            println!("iou_average:   {:.4}", metrics.iou_average);
            println!("char_accuracy: {:.4}", metrics.char_accuracy);
            println!("edit_distance: {}", metrics.edit_distance);
        }
    }
    Ok(())
}
