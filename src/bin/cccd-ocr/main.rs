//! CCCD OCR command-line tool
//!
//! Post-processes recognition output from an external OCR engine and scores
//! results against ground truth.
//!
//! # Usage
//!
//! ```bash
//! cccd-ocr process --input recognition.json --image card.jpg --output pretty
//! cccd-ocr process -i front.json -i back.json --threads 4 --output json
//! cccd-ocr process --input recognition.json --gt-text "Số: 001234567890" --output json
//! cccd-ocr evaluate --gt gt.json --pred pred.json
//! ```
//!
//! `recognition.json` holds `{"boxes": [[x, y, w, h], ...], "texts": [...], "confidences": [...]}`.

mod cli;
mod config;

use clap::{Parser, Subcommand};
use cli::OutputFormat;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "cccd-ocr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Post-processing and evaluation for Vietnamese ID card OCR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge, clean and parse a recognition dump
    Process {
        /// Recognition output as JSON (repeat for a batch)
        #[arg(long, short, required = true)]
        input: Vec<PathBuf>,

        /// Source image, used for the layout summary (one per input)
        #[arg(long)]
        image: Vec<PathBuf>,

        /// Pipeline configuration file (JSON)
        #[arg(long, env = "CCCD_CONFIG")]
        config: Option<PathBuf>,

        /// Maximum vertical center difference for fragments on one line
        #[arg(long = "y-threshold", env = "CCCD_Y_THRESHOLD")]
        y_threshold: Option<f64>,

        /// Maximum horizontal gap between fragments on one line
        #[arg(long = "x-gap-threshold", env = "CCCD_X_GAP_THRESHOLD")]
        x_gap_threshold: Option<f64>,

        /// Minimum IoU for a detection match
        #[arg(long = "iou-threshold", env = "CCCD_IOU_THRESHOLD")]
        iou_threshold: Option<f64>,

        /// Number of worker threads for a batch (defaults to number of CPUs)
        #[arg(long, env = "CCCD_THREADS")]
        threads: Option<usize>,

        /// Skip field extraction and report raw fragments
        #[arg(long)]
        unstructured: bool,

        /// Ground-truth full text
        #[arg(long = "gt-text")]
        gt_text: Option<String>,

        /// Ground-truth boxes as a JSON array of [x, y, w, h]
        #[arg(long = "gt-boxes")]
        gt_boxes: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Score a prediction against ground truth
    Evaluate {
        /// Ground truth as JSON: {"boxes": [...], "text": "..."}
        #[arg(long)]
        gt: PathBuf,

        /// Prediction as JSON: {"boxes": [...], "text": "..."}
        #[arg(long)]
        pred: PathBuf,

        /// Minimum IoU for a detection match
        #[arg(long = "iou-threshold", default_value_t = 0.5, env = "CCCD_IOU_THRESHOLD")]
        iou_threshold: f64,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    cccd_ocr::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            image,
            config: config_path,
            y_threshold,
            x_gap_threshold,
            iou_threshold,
            threads,
            unstructured,
            gt_text,
            gt_boxes,
            output,
        } => {
            let overrides = config::CliOverrides {
                y_threshold,
                x_gap_threshold,
                iou_threshold,
                max_threads: threads,
                unstructured,
            };
            let pipeline_config = config::resolve_config(config_path.as_deref(), &overrides)?;
            let ground_truth = config::ground_truth_from_flags(gt_text, gt_boxes.as_deref());

            info!("Processing {} recognition dumps", input.len());
            cli::process_files(
                &input,
                &image,
                &pipeline_config,
                &ground_truth,
                output,
            )?;
        }
        Commands::Evaluate {
            gt,
            pred,
            iou_threshold,
            output,
        } => {
            use cccd_ocr::core::ConfigValidator;

            let evaluation = cccd_ocr::evaluation::EvaluationConfig::default()
                .with_iou_threshold(iou_threshold);
            evaluation.validate()?;
            cli::evaluate_files(&gt, &pred, &evaluation, output)?;
        }
    }

    Ok(())
}
