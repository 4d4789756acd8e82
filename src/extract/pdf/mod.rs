//! Vector PDF extraction.

pub mod backend;
pub mod content;
pub mod fonts;

pub use backend::LopdfBackend;
pub use content::{ContentWalker, Matrix};
pub use fonts::FontMetrics;

use std::path::Path;

use lopdf::content::Content;

use super::{assemble_document, GeometryExtractor, PositionedWord};
use crate::detect::{verify_format, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{BBox, Document};

/// Default vertical tolerance for grouping vector words into lines.
pub const DEFAULT_LINE_TOLERANCE: f32 = 5.0;

/// Extracts word geometry from PDF content streams.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    line_tolerance: f32,
}

impl PdfExtractor {
    /// Create an extractor with the default line tolerance.
    pub fn new() -> Self {
        Self::with_line_tolerance(DEFAULT_LINE_TOLERANCE)
    }

    /// Create an extractor with a custom line tolerance (page units).
    pub fn with_line_tolerance(line_tolerance: f32) -> Self {
        Self { line_tolerance }
    }

    /// Words of a single page in top-left page coordinates.
    pub fn page_words(
        &self,
        backend: &LopdfBackend,
        page_id: lopdf::ObjectId,
    ) -> Result<Vec<PositionedWord>> {
        let content = backend.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let ops = Content::decode(&content)
            .map_err(|e| Error::Pdf(format!("cannot decode content stream: {}", e)))?;
        let fonts = backend.page_fonts(page_id)?;
        let words = ContentWalker::new(backend, &fonts).run(&ops.operations);

        let [llx, _lly, _urx, ury] = backend.media_box(page_id);
        Ok(words
            .into_iter()
            .map(|w| {
                let b = w.bbox;
                PositionedWord::new(w.text, BBox::new(b.x0 - llx, ury - b.y1, b.x1 - llx, ury - b.y0))
            })
            .collect())
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryExtractor for PdfExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn extract(&self, path: &Path) -> Result<Document> {
        verify_format(path, SourceFormat::Pdf)?;
        let backend = LopdfBackend::load_file(path)?;

        let pages = backend
            .pages()
            .into_iter()
            .map(|(page_num, page_id)| {
                let words = self.page_words(&backend, page_id)?;
                log::debug!("Page {}: {} words", page_num, words.len());
                Ok(words)
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!("Extracted {} pages from {}", pages.len(), path.display());
        Ok(assemble_document(path, pages, self.line_tolerance))
    }
}
