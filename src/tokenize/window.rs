//! Fixed-length model windows built from document pages.

use std::sync::Arc;

use super::{WordEncoder, WordEncoding};
use crate::error::{Error, Result};
use crate::model::{BBox, Document, Page};

/// Label-mask value of positions that carry no word label.
pub const IGNORE_INDEX: i64 = -100;

/// Upper bound of normalized box coordinates.
pub const BBOX_SCALE: f32 = 1000.0;

/// One model input window; every vector has the window's fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWindow {
    /// Page the window was built from
    pub page_index: usize,
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    /// Boxes normalized to 0..=1000
    pub bbox: Vec<[i64; 4]>,
    /// `0` at the first sub-token of a word, [`IGNORE_INDEX`] elsewhere
    pub label_mask: Vec<i64>,
    /// Page word (reading order) each position came from; `None` for
    /// boundary and padding tokens
    pub word_ids: Vec<Option<usize>>,
    /// Words on the page, including any lost to truncation
    pub word_count: usize,
}

impl TokenWindow {
    /// Window length.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Check if the window has no positions.
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Positions that carry a word label, in order.
    pub fn labeled_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.label_mask
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != IGNORE_INDEX)
            .map(|(i, _)| i)
    }

    /// `(position, word index)` of every labeled position, in order.
    ///
    /// Words the encoder produced no tokens for do not appear.
    pub fn labeled_words(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.labeled_positions()
            .filter_map(|pos| self.word_ids.get(pos).copied().flatten().map(|w| (pos, w)))
    }
}

/// Normalize a page-space box to the 0..=1000 grid.
///
/// `max_x` and `max_y` are the page's observed extents; values are truncated
/// toward zero and clamped.
pub fn normalize_bbox(bbox: &BBox, max_x: f32, max_y: f32) -> [i64; 4] {
    let scale = |v: f32, max: f32| -> i64 {
        let n = (BBOX_SCALE * v / max).trunc();
        n.clamp(0.0, BBOX_SCALE) as i64
    };
    [
        scale(bbox.x0, max_x),
        scale(bbox.y0, max_y),
        scale(bbox.x1, max_x),
        scale(bbox.y1, max_y),
    ]
}

/// Page extents used for normalization, at least 1.
fn page_extent(page: &Page) -> (f32, f32) {
    page.iter_words().fold((1.0f32, 1.0f32), |(mx, my), w| {
        (mx.max(w.bbox.x1), my.max(w.bbox.y1))
    })
}

/// Builds one [`TokenWindow`] per page.
#[derive(Clone)]
pub struct Windower {
    encoder: Arc<dyn WordEncoder>,
    max_length: usize,
}

impl Windower {
    /// Create a windower; `max_length` must leave room for two boundary tokens.
    pub fn new(encoder: Arc<dyn WordEncoder>, max_length: usize) -> Result<Self> {
        if max_length < 2 {
            return Err(Error::Config(format!(
                "max_length must be at least 2, got {}",
                max_length
            )));
        }
        Ok(Self {
            encoder,
            max_length,
        })
    }

    /// Window length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Build the windows of every page, in page order.
    pub fn window(&self, doc: &Document) -> Result<Vec<TokenWindow>> {
        doc.pages
            .iter()
            .enumerate()
            .map(|(i, page)| self.window_page(i, page))
            .collect()
    }

    /// Build the window of a single page.
    pub fn window_page(&self, page_index: usize, page: &Page) -> Result<TokenWindow> {
        let texts: Vec<&str> = page.iter_words().map(|w| w.text.as_str()).collect();
        let (max_x, max_y) = page_extent(page);
        let boxes: Vec<[i64; 4]> = page
            .iter_words()
            .map(|w| normalize_bbox(&w.bbox, max_x, max_y))
            .collect();

        let encoding = self.encoder.encode_words(&texts)?;
        if encoding.word_ids.len() != encoding.ids.len() {
            return Err(Error::Tokenizer(format!(
                "encoder returned {} ids but {} word ids",
                encoding.ids.len(),
                encoding.word_ids.len()
            )));
        }

        let positions = self.keep_positions(&encoding);
        if positions.len() < encoding.len() {
            log::debug!(
                "Page {}: truncated {} tokens to {}",
                page_index,
                encoding.len(),
                positions.len()
            );
        }

        let mut window = TokenWindow {
            page_index,
            input_ids: Vec::with_capacity(self.max_length),
            attention_mask: Vec::with_capacity(self.max_length),
            bbox: Vec::with_capacity(self.max_length),
            label_mask: Vec::with_capacity(self.max_length),
            word_ids: Vec::with_capacity(self.max_length),
            word_count: texts.len(),
        };

        let mut previous_word: Option<usize> = None;
        for i in positions {
            let word = encoding.word_ids[i];
            window.input_ids.push(i64::from(encoding.ids[i]));
            window.attention_mask.push(1);
            match word.and_then(|w| boxes.get(w).map(|b| (w, b))) {
                Some((w, b)) => {
                    window.bbox.push(*b);
                    window.word_ids.push(Some(w));
                    window.label_mask.push(if previous_word == Some(w) {
                        IGNORE_INDEX
                    } else {
                        0
                    });
                }
                None => {
                    window.bbox.push([0; 4]);
                    window.label_mask.push(IGNORE_INDEX);
                    window.word_ids.push(None);
                }
            }
            previous_word = word;
        }

        let pad = i64::from(self.encoder.pad_id());
        while window.input_ids.len() < self.max_length {
            window.input_ids.push(pad);
            window.attention_mask.push(0);
            window.bbox.push([0; 4]);
            window.label_mask.push(IGNORE_INDEX);
            window.word_ids.push(None);
        }

        Ok(window)
    }

    /// Token positions kept in the window: all of them when they fit, else
    /// the first `max_length - 1` followed by the final boundary token.
    fn keep_positions(&self, encoding: &WordEncoding) -> Vec<usize> {
        let n = encoding.len();
        if n <= self.max_length {
            return (0..n).collect();
        }
        let mut positions: Vec<usize> = (0..self.max_length - 1).collect();
        positions.push(n - 1);
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Line, Word};

    /// Splits words longer than three characters into two tokens.
    struct SplitEncoder;

    impl WordEncoder for SplitEncoder {
        fn encode_words(&self, words: &[&str]) -> Result<WordEncoding> {
            let mut enc = WordEncoding {
                ids: vec![0],
                word_ids: vec![None],
            };
            for (i, w) in words.iter().enumerate() {
                let pieces = if w.chars().count() > 3 { 2 } else { 1 };
                for p in 0..pieces {
                    enc.ids.push(10 + (i * 2 + p) as u32);
                    enc.word_ids.push(Some(i));
                }
            }
            enc.ids.push(2);
            enc.word_ids.push(None);
            Ok(enc)
        }

        fn pad_id(&self) -> u32 {
            1
        }
    }

    fn page(words: &[(&str, f32)]) -> Page {
        let words = words
            .iter()
            .map(|(t, x)| Word::new(*t, *t, BBox::new(*x, 0.0, *x + 50.0, 20.0)))
            .collect();
        Page::with_lines("p", 1, vec![Line::from_words("l", words)])
    }

    #[test]
    fn test_normalize_bbox() {
        let b = BBox::new(50.0, 10.0, 100.0, 20.0);
        assert_eq!(normalize_bbox(&b, 200.0, 40.0), [250, 250, 500, 500]);
        assert_eq!(normalize_bbox(&b, 99.0, 40.0)[2], 1000);
        assert_eq!(normalize_bbox(&BBox::new(0.0, 0.0, 0.5, 0.0), 1.0, 1.0)[2], 500);
        assert_eq!(normalize_bbox(&BBox::new(-4.0, 0.0, 1.0, 1.0), 10.0, 10.0)[0], 0);
    }

    #[test]
    fn test_window_alignment() {
        let windower = Windower::new(Arc::new(SplitEncoder), 8).unwrap();
        let window = windower
            .window_page(0, &page(&[("Rust", 0.0), ("Go", 60.0)]))
            .unwrap();

        assert_eq!(window.len(), 8);
        // [CLS] Ru st Go [SEP] pad pad pad
        assert_eq!(window.input_ids, vec![0, 10, 11, 12, 2, 1, 1, 1]);
        assert_eq!(window.attention_mask, vec![1, 1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(
            window.label_mask,
            vec![-100, 0, -100, 0, -100, -100, -100, -100]
        );
        assert_eq!(window.bbox[0], [0, 0, 0, 0]);
        assert_eq!(window.bbox[1], window.bbox[2]);
        assert_eq!(window.bbox[3], [545, 0, 1000, 1000]);
        assert_eq!(window.labeled_positions().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(window.word_count, 2);
    }

    /// Emits nothing for words made only of private-use glyphs.
    struct DroppingEncoder;

    impl WordEncoder for DroppingEncoder {
        fn encode_words(&self, words: &[&str]) -> Result<WordEncoding> {
            let mut enc = WordEncoding {
                ids: vec![0],
                word_ids: vec![None],
            };
            for (i, w) in words.iter().enumerate() {
                if w.chars().all(|c| ('\u{e000}'..='\u{f8ff}').contains(&c)) {
                    continue;
                }
                enc.ids.push(10 + i as u32);
                enc.word_ids.push(Some(i));
            }
            enc.ids.push(2);
            enc.word_ids.push(None);
            Ok(enc)
        }

        fn pad_id(&self) -> u32 {
            1
        }
    }

    #[test]
    fn test_window_tracks_source_words() {
        let windower = Windower::new(Arc::new(DroppingEncoder), 6).unwrap();
        let window = windower
            .window_page(0, &page(&[("Jane", 0.0), ("\u{e0b0}", 60.0), ("Doe", 120.0)]))
            .unwrap();

        assert_eq!(window.word_ids, vec![None, Some(0), Some(2), None, None, None]);
        assert_eq!(window.labeled_words().collect::<Vec<_>>(), vec![(1, 0), (2, 2)]);
        assert_eq!(window.word_count, 3);
    }

    #[test]
    fn test_window_truncation_keeps_boundary() {
        let windower = Windower::new(Arc::new(SplitEncoder), 4).unwrap();
        let window = windower
            .window_page(0, &page(&[("a", 0.0), ("b", 60.0), ("c", 120.0), ("d", 180.0)]))
            .unwrap();

        // [CLS] a b [SEP]
        assert_eq!(window.input_ids, vec![0, 10, 12, 2]);
        assert_eq!(window.label_mask, vec![-100, 0, 0, -100]);
        assert_eq!(window.labeled_positions().count(), 2);
        assert_eq!(window.word_count, 4);
    }

    #[test]
    fn test_window_empty_page() {
        let windower = Windower::new(Arc::new(SplitEncoder), 4).unwrap();
        let window = windower.window_page(0, &Page::new("p", 1)).unwrap();
        assert_eq!(window.input_ids, vec![0, 2, 1, 1]);
        assert_eq!(window.labeled_positions().count(), 0);
    }

    #[test]
    fn test_max_length_too_small() {
        assert!(matches!(
            Windower::new(Arc::new(SplitEncoder), 1),
            Err(Error::Config(_))
        ));
    }
}
