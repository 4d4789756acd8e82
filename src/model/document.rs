//! Document-level types.

use super::{Page, Word};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structured resume: pages of lines of tagged words.
///
/// Geometry is fixed once an extractor creates the document; only the
/// `ner_tag` fields are written afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Content-addressed identifier (hash of the source path)
    pub id: String,

    /// Path of the source file
    pub source_path: PathBuf,

    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a document with no pages.
    pub fn new(id: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source_path: source_path.into(),
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Total number of words.
    pub fn word_count(&self) -> usize {
        self.pages.iter().map(|p| p.word_count()).sum()
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.line_count()).sum()
    }

    /// Iterate over every word of every page in reading order.
    pub fn iter_words(&self) -> impl Iterator<Item = &Word> {
        self.pages.iter().flat_map(|p| p.iter_words())
    }

    /// Get plain text content, pages separated by a blank line.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the document contains no words.
    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }
}
