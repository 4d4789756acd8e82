//! # cvtag
//!
//! Resume structuring and scoring for Rust.
//!
//! This library turns resumes (vector PDFs or scanned images) into tagged
//! documents of words, lines and pages, and scores them field by field
//! against a requirement profile.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cvtag::{render, Pipeline, PipelineConfig};
//!
//! fn main() -> cvtag::Result<()> {
//!     let config = PipelineConfig::new()
//!         .with_model("models/layoutlm.rten")
//!         .with_tokenizer("models/tokenizer.json");
//!     let pipeline = Pipeline::from_config(config)?;
//!
//!     // Extract, window, infer and tag
//!     let doc = pipeline.parse("resume.pdf")?;
//!     println!("{}", render::to_json(&doc, render::JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Stages
//!
//! - **Extraction**: word boxes from PDF content streams or OCR, banded
//!   into lines with content-addressed ids
//! - **Windowing**: sub-word tokens aligned to words, one fixed-length
//!   window per page
//! - **Inference**: token classification on a bounded thread pool
//! - **Aggregation**: word and line tags, with email/phone rules
//! - **Scoring**: TF-IDF similarity per field against a job profile

pub mod aggregate;
pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod infer;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod score;
pub mod tokenize;

// Re-export commonly used types
pub use config::{OcrBackendKind, PipelineConfig};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SourceFormat};
pub use error::{Error, Result};
pub use extract::{ExtractorRegistry, GeometryExtractor, OcrExtractor, PdfExtractor};
pub use infer::{InferenceEngine, TokenClassifier, WindowFailurePolicy, WindowPrediction};
pub use model::{
    BBox, DegradationReason, Document, FieldDegradation, Identity, LabelSet, Line, NerTag, Page,
    Score, ScoreFactor, ScoringField, SentenceMatch, TagFieldMap, Word,
};
pub use pipeline::{Pipeline, PipelineComponents, ScoringRun, SkippedFile};
pub use render::JsonFormat;
pub use score::{FieldScorer, FittedScorer};
pub use tokenize::{TokenWindow, Windower, WordEncoder};

use std::path::Path;

/// Extract the untagged geometry of a PDF file.
///
/// Every word is tagged `O`; use a [`Pipeline`] to tag documents.
///
/// # Example
///
/// ```no_run
/// use cvtag::extract_file;
///
/// let doc = extract_file("resume.pdf").unwrap();
/// println!("Lines: {}", doc.line_count());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    ExtractorRegistry::default().extract(path.as_ref())
}

/// Extract the untagged geometry of a PDF or image with the extractors
/// described by `config`.
pub fn extract_file_with_config<P: AsRef<Path>>(
    path: P,
    config: &PipelineConfig,
) -> Result<Document> {
    config.validate()?;
    ExtractorRegistry::from_config(config)?.extract(path.as_ref())
}

/// Extract plain text from a PDF file, one line per banded line.
///
/// # Example
///
/// ```no_run
/// use cvtag::extract_text;
///
/// let text = extract_text("resume.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(extract_file(path)?.plain_text())
}
