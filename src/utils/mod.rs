//! Utility functions for the crate.
//!
//! This module provides image metadata helpers and logging setup.

use std::path::Path;

use crate::core::errors::{OCRError, OcrResult};
use crate::pipeline::ImageDimensions;

/// Reads the width and height of an image file without decoding its pixels.
pub fn image_dimensions(path: &Path) -> OcrResult<ImageDimensions> {
    let (width, height) = image::image_dimensions(path).map_err(OCRError::ImageLoad)?;
    Ok(ImageDimensions::new(width, height))
}

/// Initializes the tracing subscriber for logging.
///
/// Verbosity is controlled through the `RUST_LOG` environment variable,
/// e.g. `RUST_LOG=cccd_ocr=debug`.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        image::RgbImage::new(12, 7).save(&path).unwrap();
        assert_eq!(image_dimensions(&path).unwrap(), ImageDimensions::new(12, 7));
    }

    #[test]
    fn test_missing_image_is_load_error() {
        let err = image_dimensions(Path::new("/nonexistent/card.png")).unwrap_err();
        assert!(matches!(err, OCRError::ImageLoad(_)));
    }
}
