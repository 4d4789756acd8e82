//! JSON rendering for tagged documents.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse a document from JSON.
pub fn from_json(json: &str) -> Result<Document> {
    Ok(serde_json::from_str(json)?)
}

/// Write a document as pretty JSON.
pub fn write_json_file<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let json = to_json(doc, JsonFormat::Pretty)?;
    std::fs::write(path.as_ref(), json)?;
    log::debug!("Wrote {}", path.as_ref().display());
    Ok(())
}

/// Read a document from a JSON file.
pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let json = std::fs::read_to_string(path.as_ref())?;
    from_json(&json)
}
