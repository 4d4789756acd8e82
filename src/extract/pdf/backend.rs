//! Thin access layer over `lopdf::Document`.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::fonts::FontMetrics;
use crate::error::{Error, Result};

/// Page box `[llx, lly, urx, ury]` used when a page declares none (US Letter).
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum `/Parent` hops followed when resolving inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A font resource on a page.
pub struct PageFont<'a> {
    /// Font dictionary, used for text decoding
    pub dict: &'a Dictionary,
    /// Glyph advance widths
    pub metrics: FontMetrics,
}

/// A loaded PDF file.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::IO(io) => Error::Io(io),
            other => Error::Extraction(format!("cannot open {}: {}", path.display(), other)),
        })?;
        if doc.is_encrypted() {
            return Err(Error::Extraction(format!(
                "{} is encrypted",
                path.display()
            )));
        }
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)
            .map_err(|e| Error::Extraction(format!("cannot parse PDF: {}", e)))?;
        Ok(Self { doc })
    }

    /// Take ownership of the underlying document.
    pub fn into_inner(self) -> LopdfDocument {
        self.doc
    }

    /// All pages as page number (1-indexed) to object id.
    pub fn pages(&self) -> BTreeMap<u32, ObjectId> {
        self.doc.get_pages()
    }

    /// Resolve a reference to the object it points to.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        resolve(&self.doc, obj)
    }

    /// Page MediaBox `[llx, lly, urx, ury]`, inherited through `/Parent`.
    pub fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let mut current = self.doc.get_dictionary(page_id).ok();
        let mut depth = 0;

        while let Some(dict) = current {
            if let Some(rect) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|obj| rect_from_object(&self.doc, obj))
            {
                return rect;
            }
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }

        DEFAULT_MEDIA_BOX
    }

    /// Fonts available on a page, keyed by resource name.
    pub fn page_fonts(&self, page_id: ObjectId) -> Result<BTreeMap<Vec<u8>, PageFont<'_>>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::Pdf(e.to_string()))?;

        Ok(fonts
            .into_iter()
            .map(|(name, dict)| {
                let metrics = FontMetrics::from_dict(&self.doc, dict);
                (name, PageFont { dict, metrics })
            })
            .collect())
    }

    /// Decompressed content stream of a page; empty when the page has none.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Pdf(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => self.resolve(obj),
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(s) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = self.resolve(obj) {
                        let data = s
                            .decompressed_content()
                            .unwrap_or_else(|_| s.content.clone());
                        content.extend_from_slice(&data);
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Pdf("invalid content stream".to_string())),
        }
    }

    /// Decode a byte string with a font's encoding, falling back to simple decoding.
    pub fn decode_text(&self, font: Option<&PageFont<'_>>, bytes: &[u8]) -> String {
        if let Some(font) = font {
            if let Ok(enc) = font.dict.get_font_encoding(&self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Follow a reference; other objects are returned unchanged.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Extract a number from a PDF object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn rect_from_object(doc: &LopdfDocument, obj: &Object) -> Option<[f32; 4]> {
    let arr = resolve(doc, obj).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut v = [0.0f32; 4];
    for (slot, item) in v.iter_mut().zip(arr) {
        *slot = number(resolve(doc, item))?;
    }
    Some([v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])])
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
