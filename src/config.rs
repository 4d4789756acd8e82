//! Pipeline configuration.
//!
//! [`PipelineConfig`] can be built in code with the `with_*` methods or
//! loaded from YAML; every field has a default.
//!
//! ```yaml
//! model_path: models/layoutlm.rten
//! tokenizer_path: models/tokenizer.json
//! labels_path: models/classes.yaml
//! max_length: 512
//! inference_workers: 6
//! ocr_backends: [ocrs, tesseract]
//! window_failure: isolate
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::infer::WindowFailurePolicy;

/// OCR engine selectable in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendKind {
    /// Pure Rust `ocrs` engine
    Ocrs,
    /// Tesseract command-line tool
    Tesseract,
}

/// Configuration of a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Token-classification model (`.rten`)
    pub model_path: Option<PathBuf>,

    /// HuggingFace `tokenizer.json`
    pub tokenizer_path: Option<PathBuf>,

    /// YAML class file; the built-in label set is used when absent
    pub labels_path: Option<PathBuf>,

    /// Tokens per window, boundary tokens included
    pub max_length: usize,

    /// Threads in the inference pool
    pub inference_workers: usize,

    /// Lines of the first page scanned for email and phone numbers
    pub contact_scan_lines: usize,

    /// Vertical tolerance for banding vector PDF words into lines
    pub vector_line_tolerance: f32,

    /// Vertical spacing for banding OCR words into lines
    pub ocr_line_spacing: f32,

    /// OCR backends, tried in order
    pub ocr_backends: Vec<OcrBackendKind>,

    /// `ocrs` text detection model
    pub ocr_detection_model: Option<PathBuf>,

    /// `ocrs` text recognition model
    pub ocr_recognition_model: Option<PathBuf>,

    /// Tesseract language pack
    pub tesseract_language: String,

    /// What to do when a single window fails during inference
    pub window_failure: WindowFailurePolicy,
}

impl PipelineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Set the model path.
    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Set the tokenizer path.
    pub fn with_tokenizer(mut self, path: impl Into<PathBuf>) -> Self {
        self.tokenizer_path = Some(path.into());
        self
    }

    /// Set the label class file.
    pub fn with_labels(mut self, path: impl Into<PathBuf>) -> Self {
        self.labels_path = Some(path.into());
        self
    }

    /// Set the window length.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the number of inference threads.
    pub fn with_inference_workers(mut self, workers: usize) -> Self {
        self.inference_workers = workers;
        self
    }

    /// Set the number of lines scanned for contact details.
    pub fn with_contact_scan_lines(mut self, lines: usize) -> Self {
        self.contact_scan_lines = lines;
        self
    }

    /// Set the vector line tolerance.
    pub fn with_vector_line_tolerance(mut self, tolerance: f32) -> Self {
        self.vector_line_tolerance = tolerance;
        self
    }

    /// Set the OCR line spacing.
    pub fn with_ocr_line_spacing(mut self, spacing: f32) -> Self {
        self.ocr_line_spacing = spacing;
        self
    }

    /// Set the OCR backend chain.
    pub fn with_ocr_backends(mut self, backends: Vec<OcrBackendKind>) -> Self {
        self.ocr_backends = backends;
        self
    }

    /// Set the `ocrs` model files.
    pub fn with_ocr_models(
        mut self,
        detection: impl Into<PathBuf>,
        recognition: impl Into<PathBuf>,
    ) -> Self {
        self.ocr_detection_model = Some(detection.into());
        self.ocr_recognition_model = Some(recognition.into());
        self
    }

    /// Set the Tesseract language pack.
    pub fn with_tesseract_language(mut self, language: impl Into<String>) -> Self {
        self.tesseract_language = language.into();
        self
    }

    /// Set the window failure policy.
    pub fn with_window_failure(mut self, policy: WindowFailurePolicy) -> Self {
        self.window_failure = policy;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_length < 2 {
            return Err(Error::Config(format!(
                "max_length must be at least 2, got {}",
                self.max_length
            )));
        }
        if self.inference_workers == 0 {
            return Err(Error::Config(
                "inference_workers must be at least 1".to_string(),
            ));
        }
        let usable = |v: f32| v.is_finite() && v >= 0.0;
        if !usable(self.vector_line_tolerance) || !usable(self.ocr_line_spacing) {
            return Err(Error::Config(
                "line tolerances must be non-negative numbers".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            tokenizer_path: None,
            labels_path: None,
            max_length: 512,
            inference_workers: 6,
            contact_scan_lines: 15,
            vector_line_tolerance: 5.0,
            ocr_line_spacing: 30.0,
            ocr_backends: vec![OcrBackendKind::Ocrs, OcrBackendKind::Tesseract],
            ocr_detection_model: None,
            ocr_recognition_model: None,
            tesseract_language: "eng".to_string(),
            window_failure: WindowFailurePolicy::Isolate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_length, 512);
        assert_eq!(config.inference_workers, 6);
        assert_eq!(config.contact_scan_lines, 15);
        assert_eq!(config.window_failure, WindowFailurePolicy::Isolate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new()
            .with_max_length(128)
            .with_inference_workers(2)
            .with_ocr_backends(vec![OcrBackendKind::Tesseract])
            .with_window_failure(WindowFailurePolicy::Abort);

        assert_eq!(config.max_length, 128);
        assert_eq!(config.inference_workers, 2);
        assert_eq!(config.ocr_backends, vec![OcrBackendKind::Tesseract]);
        assert_eq!(config.window_failure, WindowFailurePolicy::Abort);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = "max_length: 256\nocr_backends: [tesseract]\nwindow_failure: abort\n";
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.max_length, 256);
        assert_eq!(config.ocr_backends, vec![OcrBackendKind::Tesseract]);
        assert_eq!(config.window_failure, WindowFailurePolicy::Abort);
        assert_eq!(config.inference_workers, 6);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            PipelineConfig::new().with_max_length(1).validate(),
            Err(Error::Config(_))
        ));
        assert!(PipelineConfig::new()
            .with_inference_workers(0)
            .validate()
            .is_err());
        assert!(matches!(
            PipelineConfig::from_yaml_str("max_length: -3"),
            Err(Error::Config(_))
        ));
    }
}
