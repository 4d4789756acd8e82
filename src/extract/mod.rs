//! Geometric text extraction.
//!
//! Extractors turn a source file into an untagged [`Document`]: words with
//! boxes in top-left page coordinates, banded into lines. Two variants are
//! provided:
//!
//! - [`PdfExtractor`] reads glyph positions from PDF content streams.
//! - [`OcrExtractor`] recognizes text in raster images through a chain of
//!   OCR backends.
//!
//! [`ExtractorRegistry`] dispatches by file extension.
//!
//! # Example
//!
//! ```no_run
//! use cvtag::extract::{ExtractorRegistry, PdfExtractor};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> cvtag::Result<()> {
//!     let mut registry = ExtractorRegistry::new();
//!     registry.register(Arc::new(PdfExtractor::new()));
//!
//!     let doc = registry.extract(Path::new("resume.pdf"))?;
//!     println!("{} words", doc.word_count());
//!     Ok(())
//! }
//! ```

pub mod banding;
pub mod ids;
pub mod ocr;
pub mod pdf;

pub use banding::{band_words, PositionedWord};
pub use ocr::{OcrBackend, OcrExtractor, OcrRegion, RegionGranularity};
pub use pdf::PdfExtractor;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::model::{Document, Line, Page, Word};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Trait for geometry extractors.
///
/// Implement this trait to add support for a new source format.
pub trait GeometryExtractor: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this extractor.
    fn name(&self) -> &str;

    /// Extract an untagged document from a file.
    fn extract(&self, path: &Path) -> Result<Document>;

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry mapping file extensions to extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn GeometryExtractor>>,
    by_name: HashMap<String, Arc<dyn GeometryExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF and OCR extractors configured from `config`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor::with_line_tolerance(
            config.vector_line_tolerance,
        )));
        registry.register(Arc::new(OcrExtractor::from_config(config)?));
        Ok(registry)
    }

    /// Register an extractor for all its supported extensions.
    pub fn register(&mut self, extractor: Arc<dyn GeometryExtractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors.insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name
            .insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn GeometryExtractor>> {
        self.extractors.get(&ext.to_lowercase()).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn GeometryExtractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&ext.to_lowercase())
    }

    /// Check if a path has a supported extension.
    pub fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.supports(e))
            .unwrap_or(false)
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Extract a file using the extractor registered for its extension.
    pub fn extract(&self, path: &Path) -> Result<Document> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;

        let extractor = self.get_by_extension(ext).ok_or_else(|| {
            Error::UnsupportedFormat(format!("no extractor for extension: {}", ext))
        })?;

        log::debug!("Extracting {} with {}", path.display(), extractor.name());
        extractor.extract(path)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor::new()));
        registry
    }
}

/// Build a document from per-page positioned words.
///
/// Word text is NFKC-normalized and trimmed; empty words are dropped. Words
/// are banded into lines with `spacing`, and every element receives its
/// content-addressed id.
pub fn assemble_document(
    path: &Path,
    pages: Vec<Vec<PositionedWord>>,
    spacing: f32,
) -> Document {
    let mut doc = Document::new(ids::document_id(path), path);

    for (page_idx, words) in pages.into_iter().enumerate() {
        let words: Vec<PositionedWord> = words
            .into_iter()
            .filter_map(|w| {
                let text: String = w.text.nfkc().collect();
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(PositionedWord::new(text, w.bbox))
                }
            })
            .collect();

        let mut page = Page::new(ids::page_id(path, page_idx), page_idx as u32 + 1);
        for (line_idx, band) in band_words(words, spacing).into_iter().enumerate() {
            let words = band
                .into_iter()
                .enumerate()
                .map(|(word_idx, w)| {
                    Word::new(
                        ids::word_id(path, page_idx, line_idx, word_idx),
                        w.text,
                        w.bbox,
                    )
                })
                .collect();
            page.push_line(Line::from_words(
                ids::line_id(path, page_idx, line_idx),
                words,
            ));
        }
        doc.add_page(page);
    }

    doc
}
