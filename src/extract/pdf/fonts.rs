//! Glyph advance widths from font dictionaries.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::backend::{number, resolve};

/// Default CID width when a Type0 font declares no `/DW`.
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// Advance width of every glyph in the Courier family.
const COURIER_WIDTH: f32 = 600.0;

/// Advance widths of a font, in thousandths of an em.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontMetrics {
    /// Character codes are two bytes wide (Type0 fonts)
    pub two_byte: bool,
    first_char: u32,
    widths: Vec<f32>,
    cid_widths: HashMap<u32, f32>,
    default_width: Option<f32>,
}

impl FontMetrics {
    /// Read metrics from a font dictionary.
    ///
    /// Simple fonts use `/FirstChar` and `/Widths`; Type0 fonts use the
    /// descendant font's `/W` and `/DW`.
    pub fn from_dict(doc: &LopdfDocument, dict: &Dictionary) -> Self {
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or_default();

        let mut metrics = if subtype == b"Type0" {
            Self::from_type0(doc, dict)
        } else {
            Self::from_simple(doc, dict)
        };

        if metrics.default_width.is_none() && metrics.widths.is_empty() {
            let base_font = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_default();
            if base_font.contains("Courier") {
                metrics.default_width = Some(COURIER_WIDTH);
            }
        }

        metrics
    }

    fn from_simple(doc: &LopdfDocument, dict: &Dictionary) -> Self {
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| number(resolve(doc, o)))
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);

        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| number(resolve(doc, w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            two_byte: false,
            first_char,
            widths,
            cid_widths: HashMap::new(),
            default_width: None,
        }
    }

    fn from_type0(doc: &LopdfDocument, dict: &Dictionary) -> Self {
        let descendant = dict
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| resolve(doc, o).as_dict().ok());

        let mut metrics = Self {
            two_byte: true,
            default_width: Some(DEFAULT_CID_WIDTH),
            ..Self::default()
        };

        let Some(descendant) = descendant else {
            return metrics;
        };

        if let Some(dw) = descendant
            .get(b"DW")
            .ok()
            .and_then(|o| number(resolve(doc, o)))
        {
            metrics.default_width = Some(dw);
        }

        if let Some(w) = descendant
            .get(b"W")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
        {
            metrics.cid_widths = parse_cid_widths(doc, w);
        }

        metrics
    }

    /// Width of a character code, if the font declares one.
    pub fn width(&self, code: u32) -> Option<f32> {
        if self.two_byte {
            return self.cid_widths.get(&code).copied().or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .or(self.default_width)
    }
}

/// Widest CID range a single `/W` entry may cover.
const MAX_CID_SPAN: u32 = 0xFFFF;

/// Parse a `/W` array: `c [w1 w2 ...]` or `c_first c_last w` entries.
///
/// Entries that overflow the CID space, run backwards or cover more than
/// [`MAX_CID_SPAN`] codes are skipped.
fn parse_cid_widths(doc: &LopdfDocument, arr: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < arr.len() {
        let Some(first) = number(resolve(doc, &arr[i])) else {
            break;
        };
        let first = first.max(0.0) as u32;

        match arr.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate().take(MAX_CID_SPAN as usize + 1) {
                    let cid = u32::try_from(offset)
                        .ok()
                        .and_then(|o| first.checked_add(o));
                    if let (Some(cid), Some(w)) = (cid, number(resolve(doc, w))) {
                        widths.insert(cid, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(w)) = (
                    number(last),
                    arr.get(i + 2).and_then(|o| number(resolve(doc, o))),
                ) else {
                    break;
                };
                let last = last.max(0.0) as u32;
                if last >= first && last - first <= MAX_CID_SPAN {
                    for cid in first..=last {
                        widths.insert(cid, w);
                    }
                } else {
                    log::debug!("Skipping /W range {}..={}", first, last);
                }
                i += 3;
            }
            None => break,
        }
    }

    widths
}

/// Width estimate by glyph class when a font declares no metrics.
pub fn estimated_width(ch: char) -> f32 {
    match ch {
        ' ' | 'i' | 'j' | 'l' | 'f' | 't' | 'I' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => {
            278.0
        }
        'm' | 'w' | 'M' | 'W' => 833.0,
        '(' | ')' | '[' | ']' | '-' | 'r' => 333.0,
        c if c.is_ascii_uppercase() => 667.0,
        c if c.is_ascii_digit() => 556.0,
        c if c.is_ascii_lowercase() => 500.0,
        c if c.is_whitespace() => 278.0,
        _ => 556.0,
    }
}
