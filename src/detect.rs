//! Source format detection by magic bytes.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Source document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Vector PDF
    Pdf,
    /// PNG raster
    Png,
    /// JPEG raster
    Jpeg,
}

impl SourceFormat {
    /// Format implied by a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "png" => Some(SourceFormat::Png),
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            _ => None,
        }
    }

    /// Format implied by a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Check if the format is a raster image.
    pub fn is_raster(&self) -> bool {
        matches!(self, SourceFormat::Png | SourceFormat::Jpeg)
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Png => "PNG",
            SourceFormat::Jpeg => "JPEG",
        };
        f.write_str(name)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";

/// Detect the format from the leading bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.starts_with(PDF_MAGIC) {
        Ok(SourceFormat::Pdf)
    } else if data.starts_with(PNG_MAGIC) {
        Ok(SourceFormat::Png)
    } else if data.starts_with(JPEG_MAGIC) {
        Ok(SourceFormat::Jpeg)
    } else {
        Err(Error::UnsupportedFormat(
            "unrecognized file signature".to_string(),
        ))
    }
}

/// Detect the format of a file from its header.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let n = file.read(&mut header)?;
    detect_format_from_bytes(&header[..n])
}

/// Check that a file's content matches the format its extension claims.
pub fn verify_format<P: AsRef<Path>>(path: P, expected: SourceFormat) -> Result<()> {
    let path = path.as_ref();
    let actual = detect_format_from_path(path).map_err(|e| match e {
        Error::UnsupportedFormat(_) => Error::Extraction(format!(
            "{} is not a valid {} file",
            path.display(),
            expected
        )),
        other => other,
    })?;
    if actual != expected {
        return Err(Error::Extraction(format!(
            "{} has a {} extension but {} content",
            path.display(),
            expected,
            actual
        )));
    }
    Ok(())
}
