//! Grouping of positioned words into horizontal lines.

use crate::model::BBox;
use std::cmp::Ordering;

/// A word with its page-space box, before ids and tags are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedWord {
    /// Word text
    pub text: String,
    /// Box in top-left page coordinates
    pub bbox: BBox,
}

impl PositionedWord {
    /// Create a positioned word.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Group words into lines by the bottom edge of their boxes.
///
/// Distinct bottom values are sorted; a new band starts whenever a value lies
/// more than `spacing` below the current band anchor. Each word joins the
/// first band whose `anchor + spacing` reaches its bottom edge. Words inside a
/// band are ordered left to right. The result does not depend on the order of
/// `words`.
pub fn band_words(words: Vec<PositionedWord>, spacing: f32) -> Vec<Vec<PositionedWord>> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut bottoms: Vec<f32> = words.iter().map(|w| w.bbox.y1).collect();
    bottoms.sort_by(f32::total_cmp);
    bottoms.dedup();

    let mut anchors: Vec<f32> = Vec::new();
    for y in bottoms {
        match anchors.last() {
            Some(anchor) if y <= anchor + spacing => {}
            _ => anchors.push(y),
        }
    }

    let mut bands: Vec<Vec<PositionedWord>> = vec![Vec::new(); anchors.len()];
    for word in words {
        // Every bottom value seeded an anchor at or above it, so a band always matches.
        if let Some(i) = anchors.iter().position(|a| word.bbox.y1 <= a + spacing) {
            bands[i].push(word);
        }
    }

    for band in &mut bands {
        band.sort_by(reading_order);
    }
    bands.retain(|b| !b.is_empty());
    bands
}

/// Left-to-right order with a total tie-break.
fn reading_order(a: &PositionedWord, b: &PositionedWord) -> Ordering {
    a.bbox
        .x0
        .total_cmp(&b.bbox.x0)
        .then_with(|| a.bbox.y1.total_cmp(&b.bbox.y1))
        .then_with(|| a.bbox.x1.total_cmp(&b.bbox.x1))
        .then_with(|| a.bbox.y0.total_cmp(&b.bbox.y0))
        .then_with(|| a.text.cmp(&b.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(text: &str, x0: f32, y1: f32) -> PositionedWord {
        PositionedWord::new(text, BBox::new(x0, y1 - 10.0, x0 + 20.0, y1))
    }

    fn texts(bands: &[Vec<PositionedWord>]) -> Vec<Vec<&str>> {
        bands
            .iter()
            .map(|b| b.iter().map(|w| w.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_band_empty() {
        assert!(band_words(Vec::new(), 30.0).is_empty());
    }

    #[test]
    fn test_band_two_lines() {
        let words = vec![
            w("Doe", 60.0, 102.0),
            w("Jane", 10.0, 100.0),
            w("Engineer", 10.0, 150.0),
        ];
        let bands = band_words(words, 30.0);
        assert_eq!(texts(&bands), vec![vec!["Jane", "Doe"], vec!["Engineer"]]);
    }

    #[test]
    fn test_band_anchor_does_not_chain() {
        // 100 anchors, 125 joins it, 140 exceeds 100 + 30 and starts a new band.
        let words = vec![w("a", 0.0, 100.0), w("b", 0.0, 125.0), w("c", 0.0, 140.0)];
        let bands = band_words(words, 30.0);
        assert_eq!(texts(&bands), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_band_insertion_order_independent() {
        let words = vec![
            w("Rust", 10.0, 50.0),
            w("Go", 40.0, 51.0),
            w("SQL", 70.0, 49.0),
            w("Python", 10.0, 90.0),
            w("same", 40.0, 90.0),
            w("tie", 40.0, 90.0),
        ];
        let forward = band_words(words.clone(), 5.0);
        let mut reversed_input = words;
        reversed_input.reverse();
        let reversed = band_words(reversed_input, 5.0);
        assert_eq!(forward, reversed);
        assert_eq!(texts(&forward)[0], vec!["Rust", "Go", "SQL"]);
    }
}
