//! OCR backend using the `ocrs` engine.
//!
//! Runs text detection and recognition models (`.rten` format) entirely in
//! Rust. Recognized lines are returned as line-level regions.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};

use super::{OcrBackend, OcrRegion};
use crate::error::{Error, Result};
use crate::model::BBox;

/// `ocrs` detection + recognition backend.
pub struct OcrsBackend {
    engine: OcrEngine,
}

impl OcrsBackend {
    /// Load the detection and recognition models from disk.
    pub fn from_model_files(detection: &Path, recognition: &Path) -> Result<Self> {
        let detection_model = rten::Model::load_file(detection).map_err(|e| {
            Error::ModelLoad(format!(
                "failed to load detection model {}: {}",
                detection.display(),
                e
            ))
        })?;
        let recognition_model = rten::Model::load_file(recognition).map_err(|e| {
            Error::ModelLoad(format!(
                "failed to load recognition model {}: {}",
                recognition.display(),
                e
            ))
        })?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| Error::ModelLoad(format!("failed to create OCR engine: {}", e)))?;

        Ok(Self { engine })
    }
}

impl OcrBackend for OcrsBackend {
    fn name(&self) -> &str {
        "ocrs"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrRegion>> {
        // The engine takes RGB input; feed it the grayscale image in three channels.
        let rgb = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|e| Error::Ocr(format!("failed to convert image: {}", e)))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| Error::Ocr(format!("failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|e| Error::Ocr(format!("text detection failed: {}", e)))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| Error::Ocr(format!("text recognition failed: {}", e)))?;

        Ok(lines
            .into_iter()
            .flatten()
            .filter_map(|line| {
                let text = line.to_string();
                if text.trim().is_empty() {
                    return None;
                }
                let rect = line.bounding_rect();
                Some(OcrRegion::line(
                    text,
                    BBox::new(
                        rect.left() as f32,
                        rect.top() as f32,
                        rect.right() as f32,
                        rect.bottom() as f32,
                    ),
                ))
            })
            .collect())
    }
}
