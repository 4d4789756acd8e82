//! Raster extraction through a chain of OCR backends.
//!
//! The image is converted to grayscale and handed to each backend in turn
//! until one succeeds:
//! - `ocrs`: pure Rust detection + recognition, line-level regions
//! - `tesseract`: command-line engine, word-level regions
//!
//! Line-level regions are split into words with synthesized boxes.

pub mod glyph;
#[cfg(feature = "ocrs")]
pub mod ocrs_backend;
pub mod tesseract;

#[cfg(feature = "ocrs")]
pub use ocrs_backend::OcrsBackend;
pub use tesseract::TesseractBackend;

use std::path::Path;
use std::sync::Arc;

use image::GrayImage;

use super::{assemble_document, GeometryExtractor, PositionedWord};
use crate::config::{OcrBackendKind, PipelineConfig};
use crate::detect::{verify_format, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{BBox, Document};

/// Default vertical spacing for grouping OCR words into lines (pixels).
pub const DEFAULT_LINE_SPACING: f32 = 30.0;

/// Granularity of a recognized region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionGranularity {
    /// A whole text line; word boxes must be synthesized
    Line,
    /// A single word
    Word,
}

/// A recognized text region in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrRegion {
    pub text: String,
    pub bbox: BBox,
    pub granularity: RegionGranularity,
}

impl OcrRegion {
    /// A line-level region.
    pub fn line(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            granularity: RegionGranularity::Line,
        }
    }

    /// A word-level region.
    pub fn word(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            granularity: RegionGranularity::Word,
        }
    }

    /// Split into positioned words.
    pub fn into_words(self) -> Vec<PositionedWord> {
        match self.granularity {
            RegionGranularity::Line => glyph::synthesize_word_boxes(&self.text, self.bbox),
            RegionGranularity::Word => vec![PositionedWord::new(self.text.trim(), self.bbox)],
        }
    }
}

/// An OCR engine.
pub trait OcrBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Whether the backend can run (binaries or models present).
    fn is_available(&self) -> bool {
        true
    }

    /// Recognize text regions in a grayscale image.
    fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrRegion>>;
}

/// Extracts words from scanned resume images.
pub struct OcrExtractor {
    backends: Vec<Arc<dyn OcrBackend>>,
    line_spacing: f32,
}

impl OcrExtractor {
    /// Create an extractor with an explicit backend chain.
    pub fn new(backends: Vec<Arc<dyn OcrBackend>>) -> Self {
        Self {
            backends,
            line_spacing: DEFAULT_LINE_SPACING,
        }
    }

    /// Set the vertical line spacing used for banding.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Build the backend chain named in the configuration.
    ///
    /// Backends that cannot be constructed are left out of the chain with a
    /// warning; extraction fails later if none remain usable.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut backends: Vec<Arc<dyn OcrBackend>> = Vec::new();

        for kind in &config.ocr_backends {
            match kind {
                OcrBackendKind::Ocrs => {
                    if let Some(backend) = ocrs_from_config(config) {
                        backends.push(backend);
                    }
                }
                OcrBackendKind::Tesseract => {
                    backends.push(Arc::new(TesseractBackend::new(
                        config.tesseract_language.clone(),
                    )));
                }
            }
        }

        let extractor = Self::new(backends).with_line_spacing(config.ocr_line_spacing);
        log::debug!("OCR chain initialized: {:?}", extractor.backend_names());
        Ok(extractor)
    }

    /// Names of the backends in the chain.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Run the chain on an image; the first backend that succeeds wins.
    pub fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrRegion>> {
        let mut failures = Vec::new();

        for backend in &self.backends {
            if !backend.is_available() {
                log::debug!("OCR backend {} not available", backend.name());
                failures.push(format!("{}: not available", backend.name()));
                continue;
            }
            match backend.recognize(image) {
                Ok(regions) => {
                    log::debug!(
                        "OCR backend {} recognized {} regions",
                        backend.name(),
                        regions.len()
                    );
                    return Ok(regions);
                }
                Err(e) => {
                    log::warn!("OCR backend {} failed: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(Error::Extraction("no OCR backend configured".to_string()));
        }
        Err(Error::Extraction(format!(
            "all OCR backends failed ({})",
            failures.join("; ")
        )))
    }

    /// Extract a document from an already decoded image.
    pub fn extract_image(&self, path: &Path, image: &GrayImage) -> Result<Document> {
        let words: Vec<PositionedWord> = self
            .recognize(image)?
            .into_iter()
            .flat_map(OcrRegion::into_words)
            .collect();
        Ok(assemble_document(path, vec![words], self.line_spacing))
    }
}

#[cfg(feature = "ocrs")]
fn ocrs_from_config(config: &PipelineConfig) -> Option<Arc<dyn OcrBackend>> {
    match (&config.ocr_detection_model, &config.ocr_recognition_model) {
        (Some(det), Some(rec)) => match OcrsBackend::from_model_files(det, rec) {
            Ok(backend) => Some(Arc::new(backend)),
            Err(e) => {
                log::warn!("OCR chain: ocrs unavailable: {}", e);
                None
            }
        },
        _ => {
            log::debug!("OCR chain: ocrs skipped, no model files configured");
            None
        }
    }
}

#[cfg(not(feature = "ocrs"))]
fn ocrs_from_config(_config: &PipelineConfig) -> Option<Arc<dyn OcrBackend>> {
    log::warn!("OCR chain: ocrs requested but the `ocrs` feature is disabled");
    None
}

impl GeometryExtractor for OcrExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["png", "jpg", "jpeg"]
    }

    fn name(&self) -> &str {
        "ocr"
    }

    fn extract(&self, path: &Path) -> Result<Document> {
        let format = SourceFormat::from_path(path)
            .filter(SourceFormat::is_raster)
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("{} is not a raster image", path.display()))
            })?;
        verify_format(path, format)?;

        let image = image::open(path)?.to_luma8();
        log::debug!(
            "OCR input {}: {}x{}",
            path.display(),
            image.width(),
            image.height()
        );
        self.extract_image(path, &image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    impl OcrBackend for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _image: &GrayImage) -> Result<Vec<OcrRegion>> {
            Err(Error::Ocr("engine crashed".to_string()))
        }
    }

    struct Fixed {
        calls: AtomicUsize,
    }

    impl OcrBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _image: &GrayImage) -> Result<Vec<OcrRegion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                OcrRegion::line("Jane Doe", BBox::new(10.0, 10.0, 110.0, 30.0)),
                OcrRegion::word("Python", BBox::new(10.0, 80.0, 70.0, 100.0)),
            ])
        }
    }

    #[test]
    fn test_fallback_to_second_backend() {
        let fixed = Arc::new(Fixed {
            calls: AtomicUsize::new(0),
        });
        let extractor = OcrExtractor::new(vec![Arc::new(Failing), fixed.clone()]);
        let image = GrayImage::new(200, 200);

        let doc = extractor.extract_image(Path::new("scan.png"), &image).unwrap();
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 1);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].plain_text(), "Jane Doe\nPython");
    }

    #[test]
    fn test_all_backends_fail() {
        let extractor = OcrExtractor::new(vec![Arc::new(Failing)]);
        let result = extractor.recognize(&GrayImage::new(4, 4));
        assert!(matches!(result, Err(Error::Extraction(_))));

        let empty = OcrExtractor::new(Vec::new());
        assert!(matches!(
            empty.recognize(&GrayImage::new(4, 4)),
            Err(Error::Extraction(_))
        ));
    }

    #[test]
    fn test_chain_from_config() {
        let config = PipelineConfig::new()
            .with_ocr_backends(vec![OcrBackendKind::Tesseract, OcrBackendKind::Ocrs])
            .with_tesseract_language("deu");
        // No ocrs model files are configured, so only tesseract remains.
        let extractor = OcrExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.backend_names(), vec!["tesseract"]);
    }

    #[test]
    fn test_rejects_non_raster() {
        let extractor = OcrExtractor::new(Vec::new());
        assert!(matches!(
            extractor.extract(Path::new("resume.pdf")),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
