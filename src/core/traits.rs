//! Interfaces to collaborators outside the post-processing pipeline.

use image::RgbImage;
use std::fmt::Debug;

use crate::core::errors::OcrResult;
use crate::processors::TextBox;

/// A text detection and recognition engine.
///
/// The pipeline never owns a global engine; callers construct one and pass it
/// to [`CccdPipeline::recognize_and_process`](crate::pipeline::CccdPipeline::recognize_and_process).
///
/// # Examples
///
/// ```rust
/// use cccd_ocr::core::{OcrResult, TextRecognizer};
/// use cccd_ocr::processors::{BoundingBox, TextBox};
/// use image::RgbImage;
///
/// #[derive(Debug)]
/// struct FixedRecognizer;
///
/// impl TextRecognizer for FixedRecognizer {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn recognize(&self, _image: &RgbImage) -> OcrResult<Vec<TextBox>> {
///         Ok(vec![TextBox::new(BoundingBox::new(0, 0, 40, 12), "Nam", 0.99)])
///     }
/// }
///
/// let boxes = FixedRecognizer.recognize(&RgbImage::new(64, 64)).unwrap();
/// assert_eq!(boxes[0].text, "Nam");
/// ```
pub trait TextRecognizer: Send + Sync + Debug {
    /// Engine name, used in logs and error context.
    fn name(&self) -> &str;

    /// Detects and recognizes text fragments, in any order.
    fn recognize(&self, image: &RgbImage) -> OcrResult<Vec<TextBox>>;
}
