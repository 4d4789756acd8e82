//! Word boxes synthesized from line-level OCR regions.
//!
//! Line text is split into word-like tokens and the line width is shared out
//! in proportion to each token's estimated glyph width.

use crate::extract::PositionedWord;
use crate::model::BBox;

/// Width correction, in letters, for characters narrower or wider than average.
pub fn char_adjustment(c: char) -> f32 {
    match c {
        'Q' | 'Y' | 'O' | 'A' | 'S' | 'D' | 'G' | 'H' | 'V' | 'N' | '$' => 0.25,
        'w' | 'm' | 'M' | '@' | '%' | '2' => 0.5,
        'i' | 'I' | 'l' | '!' | '|' | ':' | ',' | ';' | '.' | '\u{b7}' => -0.75,
        'f' | 'z' | 'c' | '\\' | '/' | '?' => -0.25,
        'r' | 't' | '1' => -0.4375,
        '\'' | '-' => -0.9,
        'T' | '#' | 'X' => 0.125,
        's' | 'L' => -0.125,
        'j' | '(' | ')' | '`' | '[' | ']' => -0.5,
        ' ' => -0.8,
        'W' => 0.875,
        _ => 0.0,
    }
}

/// Sum of the width corrections of a token.
pub fn width_adjustment(token: &str) -> f32 {
    token.chars().map(char_adjustment).sum()
}

/// Estimated width of a token in letters.
fn letter_units(token: &str) -> f32 {
    token.chars().count() as f32 + width_adjustment(token)
}

#[derive(Clone, Copy, PartialEq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Space,
    Symbol,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_uppercase() {
        CharClass::Upper
    } else if c.is_ascii_lowercase() {
        CharClass::Lower
    } else if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Symbol
    }
}

/// Split text into capitalized words, uppercase runs, numbers, symbol runs
/// and whitespace runs.
///
/// An uppercase run directly followed by a lowercase letter gives up its
/// last letter to the following capitalized word (`"HTMLParser"` splits into
/// `"HTML"` and `"Parser"`).
pub fn split_tokens(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let start = i;
        match classify(chars[i]) {
            CharClass::Upper => {
                let mut end = i;
                while end < chars.len() && classify(chars[end]) == CharClass::Upper {
                    end += 1;
                }
                let followed_by_lower =
                    end < chars.len() && classify(chars[end]) == CharClass::Lower;
                if followed_by_lower && end - i == 1 {
                    // Capitalized word.
                    end += 1;
                    while end < chars.len() && classify(chars[end]) == CharClass::Lower {
                        end += 1;
                    }
                } else if followed_by_lower {
                    end -= 1;
                }
                i = end;
            }
            class => {
                while i < chars.len() && classify(chars[i]) == class {
                    i += 1;
                }
            }
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

fn starts_with_non_word(token: &str) -> bool {
    token
        .chars()
        .next()
        .map(|c| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(false)
}

/// Split text and fold symbol and whitespace tokens into the preceding token.
pub fn split_and_merge(text: &str) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for token in split_tokens(text) {
        let attach = starts_with_non_word(&token) || token.chars().all(char::is_whitespace);
        match merged.last_mut() {
            Some(last) if attach => last.push_str(&token),
            _ => merged.push(token),
        }
    }
    merged
}

/// Distribute a line box over the words of its text.
///
/// Each token's x-extent is proportional to its letter count plus width
/// corrections; the vertical extent is the line's. Token text is trimmed.
pub fn synthesize_word_boxes(text: &str, line: BBox) -> Vec<PositionedWord> {
    let tokens = split_and_merge(text);
    let total: f32 = tokens.iter().map(|t| letter_units(t)).sum();
    if tokens.is_empty() || total <= 0.0 {
        return Vec::new();
    }

    let letter_width = line.width() / total;
    let mut consumed = 0.0f32;
    let mut words = Vec::with_capacity(tokens.len());

    for token in &tokens {
        let units = letter_units(token);
        let x0 = line.x0 + (letter_width * consumed).floor();
        let x1 = x0 + (letter_width * units).floor();
        words.push(PositionedWord::new(
            token.trim(),
            BBox::new(x0, line.y0, x1, line.y1),
        ));
        consumed += units;
    }

    words
}
