//! Error types for cvtag.

use std::io;
use thiserror::Error;

/// Result type alias for cvtag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, tagging, or scoring resumes.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document could not be opened or decoded.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The file format is not handled by any registered extractor.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading the PDF structure.
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    /// Every OCR backend in the chain failed.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Tokenizer could not be loaded or failed to encode.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// The model artifact or label vocabulary failed validation.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// A single window failed during inference.
    #[error("Inference error in window {window}: {message}")]
    Inference {
        /// Index of the failing window (page index).
        window: usize,
        /// Backend message.
        message: String,
    },

    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error while producing a visualization overlay.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether the error only affects the document being processed.
    ///
    /// Batch runs skip such documents and continue with the rest.
    pub fn is_document_local(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Extraction(_)
                | Error::UnsupportedFormat(_)
                | Error::Pdf(_)
                | Error::Ocr(_)
                | Error::Tokenizer(_)
                | Error::Inference { .. }
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Extraction(format!("image decoding failed: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}
