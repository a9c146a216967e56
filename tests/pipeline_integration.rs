//! End-to-end tests of the public pipeline API.

use cccd_ocr::evaluation::{DetectionScorer, TextScorer, levenshtein};
use cccd_ocr::pipeline::ImageDimensions;
use cccd_ocr::prelude::*;
use cccd_ocr::processors::{RecognitionOutput, iou};
use std::io::Write;

fn fragment(x: i32, y: i32, w: u32, h: u32, text: &str) -> TextBox {
    TextBox::new(BoundingBox::new(x, y, w, h), text, 0.95)
}

/// Fragments of a card front as an engine would return them: unordered, with
/// labels and values split into separate boxes and a stray mark.
fn card_fragments() -> Vec<TextBox> {
    vec![
        fragment(150, 130, 220, 24, "001234567890"),
        fragment(40, 20, 420, 24, "CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM"),
        fragment(110, 50, 280, 22, "Độc lập - Tự do - Hạnh phúc"),
        fragment(120, 90, 260, 30, "CĂN CƯỚC CÔNG DÂN"),
        fragment(40, 131, 90, 24, "So:"),
        fragment(40, 170, 120, 22, "Họ và tên:"),
        fragment(170, 171, 200, 22, "NGUYỄN VĂN A"),
        fragment(40, 210, 110, 22, "Ngày sinh:"),
        fragment(160, 211, 120, 22, "O1/O2/199C"),
        fragment(40, 250, 100, 22, "Giới tính:"),
        fragment(150, 250, 40, 22, "Nam"),
        fragment(470, 250, 6, 22, "."),
        fragment(40, 290, 110, 22, "Quốc tịch:"),
        fragment(160, 290, 110, 22, "Việt Nam"),
        fragment(40, 330, 110, 22, "Quê quán:"),
        fragment(160, 331, 200, 22, "Hà Nội"),
        fragment(40, 370, 150, 22, "Nơi thường trú:"),
        fragment(200, 370, 260, 22, "12 Phố Huế, Hà Nội"),
        fragment(40, 410, 180, 22, "Có giá trị đến:"),
        fragment(230, 410, 120, 22, "01/02/2035"),
    ]
}

#[test]
fn test_label_and_name_on_separate_rows() {
    let pipeline = CccdPipeline::builder().build().unwrap();
    let boxes = [BoundingBox::new(10, 10, 200, 20), BoundingBox::new(10, 60, 200, 20)];
    let output = pipeline
        .process(&boxes, &["Số: 123456789012", "Nguyễn Văn A"])
        .unwrap();

    assert_eq!(output.merged_lines.len(), 2);
    assert_eq!(output.structured.id_number, "123456789012");
    // No name label, so the second line is not read as a name.
    assert!(output.structured.name.is_empty());
    assert_eq!(output.full_text, "Số: 123456789012\nNguyễn Văn A");
}

#[test]
fn test_full_card() {
    let pipeline = CccdPipeline::builder().build().unwrap();
    let output = pipeline.process_text_boxes(&card_fragments());
    let record = &output.structured;

    assert_eq!(record.title, "CĂN CƯỚC CÔNG DÂN");
    assert_eq!(record.subtitle, "Độc lập - Tự do - Hạnh phúc");
    assert_eq!(record.id_number, "001234567890");
    assert_eq!(record.name, "NGUYỄN VĂN A");
    assert_eq!(record.date_of_birth, "01/02/1990");
    assert_eq!(record.gender, "Nam");
    assert_eq!(record.nationality, "Việt Nam");
    assert_eq!(record.place_of_origin, "Hà Nội");
    assert_eq!(record.place_of_residence, "12 Phố Huế, Hà Nội");
    assert_eq!(record.expiry_date, "01/02/2035");

    // The stray "." is its own line and is filtered out.
    assert_eq!(output.merged_lines.len(), 11);
    assert!(output.merged_lines.iter().all(|line| line.text != "."));
    assert_eq!(record.raw_lines.len(), output.merged_lines.len());
    assert_eq!(output.merged_lines[3].text, "So: 001234567890");
    assert_eq!(record.raw_lines[3], "Số: 001234567890");

    let ids: Vec<usize> = output.merged_lines.iter().map(|line| line.line_id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[test]
fn test_report_from_recognition_dump_with_evaluation() {
    let dump = r#"{
        "boxes": [[10, 10, 120, 20], [140, 12, 60, 20], [10, 60, 200, 20]],
        "texts": ["Giới tính:", "Nữ", "Quốc tịch: Việt Nam"],
        "confidences": [0.99, 0.97, 0.95]
    }"#;
    let recognition: RecognitionOutput = serde_json::from_str(dump).unwrap();
    let items = recognition.into_text_boxes().unwrap();

    let pipeline = CccdPipeline::builder().build().unwrap();
    let mut report = pipeline.report(items, ImageDimensions::new(400, 100));

    let record = report.structured.as_ref().unwrap();
    assert_eq!(record.gender, "Nữ");
    assert_eq!(record.nationality, "Việt Nam");
    assert_eq!(report.layout_summary.num_text_boxes, 3);
    assert_eq!(report.layout_summary.avg_box_size, 2533.33);
    assert_eq!(report.layout_summary.text_density_percent, 19.0);

    let gt = GroundTruth {
        boxes: vec![BoundingBox::new(10, 10, 190, 22), BoundingBox::new(10, 60, 200, 20)],
        text: Some("Giới tính: Nữ Quốc tịch: Việt Nam".to_string()),
    };
    let metrics = report.evaluate(&gt, &EvaluationConfig::default()).unwrap();
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.char_accuracy, 1.0);
    assert_eq!(metrics.edit_distance, 0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["lines"][0]["box"], serde_json::json!([10, 10, 190, 22]));
    assert_eq!(json["structured"]["gender"], "Nữ");
}

#[test]
fn test_pipeline_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"line_merge": {{"x_gap_threshold": 5.0}}, "parallel": {{"batch_threshold": 0}}}}"#
    )
    .unwrap();
    let config = PipelineConfig::from_json_file(file.path()).unwrap();
    let pipeline = CccdPipeline::from_config(&config).unwrap();

    // A 10px gap no longer joins fragments.
    let items = vec![fragment(0, 0, 100, 20, "Giới tính:"), fragment(110, 0, 40, 20, "Nam")];
    let outputs = pipeline.process_batch(&[items.clone(), items]);
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].merged_lines.len(), 2);
    assert_eq!(outputs[0].structured.gender, "Nam");
}

#[test]
fn test_scorers_on_identical_input() {
    let b = BoundingBox::new(5, 5, 50, 50);
    assert!((iou(&b, &b) - 1.0).abs() < 1e-6);
    assert_eq!(iou(&b, &BoundingBox::new(100, 100, 5, 5)), 0.0);

    let detection = DetectionScorer::default().score(&[b], &[b]);
    assert_eq!(detection.hmean, 1.0);
    assert!((detection.iou_average - 1.0).abs() < 1e-6);

    assert_eq!(levenshtein("Hà Nội", "Hà Nội"), 0);
    assert_eq!(TextScorer::new().score("Hà Nội", "Hà Nội").char_accuracy, 1.0);
}

#[test]
fn test_invalid_dump_box_rejected() {
    let dump = r#"{"boxes": [[0, 0, -5, 10]], "texts": ["x"]}"#;
    assert!(serde_json::from_str::<RecognitionOutput>(dump).is_err());

    let mismatch = RecognitionOutput {
        boxes: vec![BoundingBox::new(0, 0, 1, 1)],
        texts: Vec::new(),
        confidences: Vec::new(),
    };
    assert!(matches!(
        mismatch.into_text_boxes(),
        Err(OCRError::InputMismatch { .. })
    ));
}
