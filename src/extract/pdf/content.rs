//! Content-stream interpretation into positioned words.
//!
//! The walker keeps the graphics-state stack and the full text state, and
//! turns every shown glyph into a box in user space. Glyphs are joined into
//! words until whitespace, a large `TJ` adjustment, or a jump in position.

use std::collections::BTreeMap;

use lopdf::content::Operation;
use lopdf::Object;

use super::backend::{number, LopdfBackend, PageFont};
use super::fonts::estimated_width;
use crate::extract::PositionedWord;
use crate::model::BBox;

/// `TJ` adjustment (thousandths of an em) above which a word break is assumed.
const TJ_WORD_BREAK: f32 = 200.0;

/// Glyph descent and ascent in em units, used for box heights.
const DESCENT: f32 = -0.2;
const ASCENT: f32 = 0.8;

/// Maximum gap between glyphs of the same word, relative to the glyph size.
const GLYPH_JOIN_RATIO: f32 = 0.3;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Pure translation.
    pub fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Read a matrix from six numeric operands.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let mut v = [0.0f32; 6];
        for (slot, op) in v.iter_mut().zip(operands) {
            *slot = number(op)?;
        }
        Some(Self::new(v[0], v[1], v[2], v[3], v[4], v[5]))
    }
}

/// Text state parameters; saved and restored with the graphics state.
#[derive(Debug, Clone)]
struct TextState {
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    font: Vec<u8>,
    font_size: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            font: Vec::new(),
            font_size: 12.0,
            rise: 0.0,
        }
    }
}

/// A word being assembled from glyphs, in user space.
#[derive(Debug)]
struct WordBuilder {
    text: String,
    bbox: BBox,
    end: (f32, f32),
    size: f32,
}

/// Walks one page's content stream.
pub struct ContentWalker<'a> {
    backend: &'a LopdfBackend,
    fonts: &'a BTreeMap<Vec<u8>, PageFont<'a>>,
    ctm: Matrix,
    state: TextState,
    stack: Vec<(Matrix, TextState)>,
    tm: Matrix,
    tlm: Matrix,
    current: Option<WordBuilder>,
    words: Vec<PositionedWord>,
}

impl<'a> ContentWalker<'a> {
    /// Create a walker for a page with the given font resources.
    pub fn new(backend: &'a LopdfBackend, fonts: &'a BTreeMap<Vec<u8>, PageFont<'a>>) -> Self {
        Self {
            backend,
            fonts,
            ctm: Matrix::IDENTITY,
            state: TextState::default(),
            stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            current: None,
            words: Vec::new(),
        }
    }

    /// Interpret the operations and return words in user space (y up).
    pub fn run(mut self, operations: &[Operation]) -> Vec<PositionedWord> {
        for op in operations {
            self.step(op);
        }
        self.flush();
        self.words
    }

    fn step(&mut self, op: &Operation) {
        let operands = &op.operands;
        let num = |i: usize| operands.get(i).and_then(number);

        match op.operator.as_str() {
            "q" => self.stack.push((self.ctm, self.state.clone())),
            "Q" => {
                if let Some((ctm, state)) = self.stack.pop() {
                    self.ctm = ctm;
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.concat(&self.ctm);
                }
            }
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "ET" => self.flush(),
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.state.font = name.clone();
                }
                if let Some(size) = num(1) {
                    self.state.font_size = size;
                }
            }
            "Tc" => self.state.char_spacing = num(0).unwrap_or(0.0),
            "Tw" => self.state.word_spacing = num(0).unwrap_or(0.0),
            "Tz" => self.state.horizontal_scale = num(0).unwrap_or(100.0) / 100.0,
            "TL" => self.state.leading = num(0).unwrap_or(0.0),
            "Ts" => self.state.rise = num(0).unwrap_or(0.0),
            "Td" => self.move_text(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
            "TD" => {
                let ty = num(1).unwrap_or(0.0);
                self.state.leading = -ty;
                self.move_text(num(0).unwrap_or(0.0), ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if let Some(n) = number(other) {
                                    self.adjust(n);
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                self.state.word_spacing = num(0).unwrap_or(0.0);
                self.state.char_spacing = num(1).unwrap_or(0.0);
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            _ => {}
        }
    }

    fn move_text(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translate(tx, ty).concat(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_text(0.0, -self.state.leading);
    }

    /// Apply a `TJ` number: shift left by `n` thousandths of an em.
    fn adjust(&mut self, n: f32) {
        let tx = -n / 1000.0 * self.state.font_size * self.state.horizontal_scale;
        self.tm = Matrix::translate(tx, 0.0).concat(&self.tm);
        if -n > TJ_WORD_BREAK {
            self.flush();
        }
    }

    /// Show a string: position each glyph and advance the text matrix.
    fn show(&mut self, bytes: &[u8]) {
        let fonts = self.fonts;
        let font = fonts.get(&self.state.font);
        let two_byte = font.map(|f| f.metrics.two_byte).unwrap_or(false);
        let code_len = if two_byte { 2 } else { 1 };

        for chunk in bytes.chunks(code_len) {
            let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
            let text = self.backend.decode_text(font, chunk);

            let width = font
                .and_then(|f| f.metrics.width(code))
                .unwrap_or_else(|| estimated_width(text.chars().next().unwrap_or(' ')))
                / 1000.0;

            let is_space = text.chars().all(char::is_whitespace);
            if is_space {
                self.flush();
            } else {
                self.push_glyph(&text, width);
            }

            let word_spacing = if code_len == 1 && code == 32 {
                self.state.word_spacing
            } else {
                0.0
            };
            let tx = (width * self.state.font_size + self.state.char_spacing + word_spacing)
                * self.state.horizontal_scale;
            self.tm = Matrix::translate(tx, 0.0).concat(&self.tm);
        }
    }

    fn push_glyph(&mut self, text: &str, width: f32) {
        let s = &self.state;
        let trm = Matrix::new(
            s.font_size * s.horizontal_scale,
            0.0,
            0.0,
            s.font_size,
            0.0,
            s.rise,
        )
        .concat(&self.tm)
        .concat(&self.ctm);

        let corners = [
            trm.apply(0.0, DESCENT),
            trm.apply(width, DESCENT),
            trm.apply(0.0, ASCENT),
            trm.apply(width, ASCENT),
        ];
        let (mut x0, mut y0) = corners[0];
        let (mut x1, mut y1) = corners[0];
        for (x, y) in &corners[1..] {
            x0 = x0.min(*x);
            y0 = y0.min(*y);
            x1 = x1.max(*x);
            y1 = y1.max(*y);
        }
        let bbox = BBox::new(x0, y0, x1, y1);
        let origin = trm.apply(0.0, 0.0);
        let end = trm.apply(width, 0.0);
        let size = (trm.c * trm.c + trm.d * trm.d).sqrt();

        if let Some(current) = &self.current {
            let (ex, ey) = current.end;
            let gap = ((origin.0 - ex).powi(2) + (origin.1 - ey).powi(2)).sqrt();
            if gap > GLYPH_JOIN_RATIO * current.size.max(size) {
                self.flush();
            }
        }

        match &mut self.current {
            Some(current) => {
                current.text.push_str(text);
                current.bbox = current.bbox.union(&bbox);
                current.end = end;
                current.size = current.size.max(size);
            }
            None => {
                self.current = Some(WordBuilder {
                    text: text.to_string(),
                    bbox,
                    end,
                    size,
                });
            }
        }
    }

    fn flush(&mut self) {
        if let Some(word) = self.current.take() {
            if !word.text.trim().is_empty() {
                self.words.push(PositionedWord::new(word.text, word.bbox));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_concat_order() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::translate(10.0, 5.0);
        // Scale first, then shift.
        assert_eq!(scale.concat(&shift).apply(1.0, 1.0), (12.0, 7.0));
        // Shift first, then scale.
        assert_eq!(shift.concat(&scale).apply(1.0, 1.0), (22.0, 12.0));
    }

    #[test]
    fn test_matrix_from_operands() {
        let ops = vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Real(72.0),
            Object::Integer(700),
        ];
        let m = Matrix::from_operands(&ops).unwrap();
        assert_eq!(m.apply(0.0, 0.0), (72.0, 700.0));
        assert!(Matrix::from_operands(&ops[..3]).is_none());
    }
}
