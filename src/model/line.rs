//! Line- and word-level types.

use super::NerTag;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding rectangle `[x0, y0, x1, y1]`.
///
/// Coordinates use a top-left origin for both PDF and raster sources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, ordering the corners so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Bounding rectangle of a set of boxes, `None` when the set is empty.
    pub fn bounding<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(a) => Some(a.union(b)),
        })
    }

    /// Corners as an array.
    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self {
            x0: v[0],
            y0: v[1],
            x1: v[2],
            y1: v[3],
        }
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

/// A single word with its geometry and entity tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Content-addressed identifier
    pub id: String,

    /// Word text
    pub text: String,

    /// Bounding box
    pub bbox: BBox,

    /// Entity tag (`O` until tagged)
    #[serde(default)]
    pub ner_tag: NerTag,
}

impl Word {
    /// Create an untagged word.
    pub fn new(id: impl Into<String>, text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            bbox,
            ner_tag: NerTag::O,
        }
    }
}

/// A line of words in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Content-addressed identifier
    pub id: String,

    /// Space-joined word texts
    pub text: String,

    /// Bounding rectangle of the words
    pub bbox: BBox,

    /// Words in reading order
    pub words: Vec<Word>,

    /// Aggregate entity tag
    #[serde(default)]
    pub ner_tag: NerTag,
}

impl Line {
    /// Build a line from its words, deriving text and bounding box.
    pub fn from_words(id: impl Into<String>, words: Vec<Word>) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let bbox = BBox::bounding(words.iter().map(|w| &w.bbox)).unwrap_or_default();
        Self {
            id: id.into(),
            text,
            bbox,
            words,
            ner_tag: NerTag::O,
        }
    }

    /// Recompute the aggregate tag from the word tags.
    ///
    /// `O` iff no word carries a non-`O` tag; otherwise the most frequent
    /// non-`O` tag, ties broken by first occurrence in word order.
    pub fn aggregate_tag(&mut self) {
        let mut counts: Vec<(&NerTag, usize)> = Vec::new();
        for word in &self.words {
            if word.ner_tag.is_outside() {
                continue;
            }
            match counts.iter_mut().find(|(tag, _)| **tag == word.ner_tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((&word.ner_tag, 1)),
            }
        }

        // Strict comparison keeps the earliest tag on ties.
        let mut best: Option<(&NerTag, usize)> = None;
        for (tag, n) in counts {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((tag, n));
            }
        }

        self.ner_tag = best.map(|(tag, _)| tag.clone()).unwrap_or(NerTag::O);
    }

    /// Number of words on the line.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: f32, tag: NerTag) -> Word {
        let mut w = Word::new(text, text, BBox::new(x0, 10.0, x0 + 20.0, 20.0));
        w.ner_tag = tag;
        w
    }

    #[test]
    fn test_bbox_new_orders_corners() {
        let b = BBox::new(30.0, 40.0, 10.0, 5.0);
        assert_eq!(b.to_array(), [10.0, 5.0, 30.0, 40.0]);
        assert_eq!(b.width(), 20.0);
        assert_eq!(b.height(), 35.0);
    }

    #[test]
    fn test_bbox_bounding() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, -2.0, 20.0, 8.0);
        assert_eq!(
            BBox::bounding([&a, &b]).unwrap().to_array(),
            [0.0, -2.0, 20.0, 10.0]
        );
        assert!(BBox::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn test_line_from_words() {
        let line = Line::from_words(
            "l",
            vec![word("Senior", 0.0, NerTag::O), word("Engineer", 30.0, NerTag::O)],
        );
        assert_eq!(line.text, "Senior Engineer");
        assert_eq!(line.bbox.to_array(), [0.0, 10.0, 50.0, 20.0]);
    }

    #[test]
    fn test_aggregate_all_outside() {
        let mut line = Line::from_words("l", vec![word("a", 0.0, NerTag::O)]);
        line.ner_tag = NerTag::Hardskill;
        line.aggregate_tag();
        assert_eq!(line.ner_tag, NerTag::O);
    }

    #[test]
    fn test_aggregate_majority() {
        let mut line = Line::from_words(
            "l",
            vec![
                word("a", 0.0, NerTag::Softskill),
                word("b", 10.0, NerTag::Hardskill),
                word("c", 20.0, NerTag::Hardskill),
                word("d", 30.0, NerTag::O),
            ],
        );
        line.aggregate_tag();
        assert_eq!(line.ner_tag, NerTag::Hardskill);
    }

    #[test]
    fn test_aggregate_tie_first_occurrence() {
        // Alphabetical order would pick Education; first-seen picks Project.
        let mut line = Line::from_words(
            "l",
            vec![
                word("a", 0.0, NerTag::Project),
                word("b", 10.0, NerTag::Education),
                word("c", 20.0, NerTag::Education),
                word("d", 30.0, NerTag::Project),
            ],
        );
        line.aggregate_tag();
        assert_eq!(line.ner_tag, NerTag::Project);
    }

    #[test]
    fn test_bbox_serializes_as_array() {
        let b = BBox::new(1.0, 2.0, 3.0, 4.5);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.5]");
        let back: BBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
