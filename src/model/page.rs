//! Page-level types.

use super::{Line, Word};
use serde::{Deserialize, Serialize};

/// A single page in the document.
///
/// `line_count` always equals `lines.len()`; mutate through
/// [`Page::push_line`] and [`Page::set_lines`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageRepr")]
pub struct Page {
    /// Content-addressed identifier
    pub id: String,

    /// Page number (1-indexed)
    pub number: u32,

    /// Lines in reading order
    lines: Vec<Line>,

    /// Number of lines
    line_count: usize,
}

/// Deserialized form; `line_count` is recomputed from the lines.
#[derive(Deserialize)]
struct PageRepr {
    id: String,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    lines: Vec<Line>,
}

impl From<PageRepr> for Page {
    fn from(repr: PageRepr) -> Self {
        Page::with_lines(repr.id, repr.number, repr.lines)
    }
}

impl Page {
    /// Create an empty page.
    pub fn new(id: impl Into<String>, number: u32) -> Self {
        Self {
            id: id.into(),
            number,
            lines: Vec::new(),
            line_count: 0,
        }
    }

    /// Create a page from lines.
    pub fn with_lines(id: impl Into<String>, number: u32, lines: Vec<Line>) -> Self {
        let mut page = Self::new(id, number);
        page.set_lines(lines);
        page
    }

    /// Append a line.
    pub fn push_line(&mut self, line: Line) {
        self.lines.push(line);
        self.line_count = self.lines.len();
    }

    /// Replace all lines.
    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = lines;
        self.line_count = self.lines.len();
    }

    /// Lines in reading order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Mutable access to the lines. The number of lines cannot change.
    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Iterate over all words in reading order.
    pub fn iter_words(&self) -> impl Iterator<Item = &Word> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    /// Number of words on the page.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.word_count()).sum()
    }

    /// Get plain text content of the page, one line per row.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the page has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn line(id: &str, texts: &[&str]) -> Line {
        let words = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let x0 = i as f32 * 10.0;
                Word::new(*t, *t, BBox::new(x0, 0.0, x0 + 8.0, 10.0))
            })
            .collect();
        Line::from_words(id, words)
    }

    #[test]
    fn test_line_count_tracks_mutations() {
        let mut page = Page::new("p", 1);
        assert_eq!(page.line_count(), 0);
        page.push_line(line("a", &["one"]));
        page.push_line(line("b", &["two", "three"]));
        assert_eq!(page.line_count(), 2);
        assert_eq!(page.word_count(), 3);

        page.set_lines(vec![line("c", &["four"])]);
        assert_eq!(page.line_count(), 1);
        assert_eq!(page.plain_text(), "four");
    }

    #[test]
    fn test_deserialize_recomputes_line_count() {
        let json = r#"{"id":"p","number":1,"lines":[],"line_count":7}"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.line_count(), 0);
    }

    #[test]
    fn test_iter_words_reading_order() {
        let page = Page::with_lines("p", 1, vec![line("a", &["x", "y"]), line("b", &["z"])]);
        let texts: Vec<_> = page.iter_words().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["x", "y", "z"]);
    }
}
