//! OCR backend using the Tesseract command-line tool.
//!
//! The image is written to a scratch PNG and `tesseract <image> stdout -l
//! <lang> tsv` is run; word rows (level 5) of the TSV become word regions.

use std::process::Command;
use std::sync::OnceLock;

use image::GrayImage;
use tempfile::TempDir;

use super::{OcrBackend, OcrRegion};
use crate::error::{Error, Result};
use crate::model::BBox;

/// TSV level of word rows.
const WORD_LEVEL: &str = "5";

/// Tesseract CLI backend.
pub struct TesseractBackend {
    language: String,
    available: OnceLock<bool>,
}

impl TesseractBackend {
    /// Create a backend for the given language pack (e.g. `"eng"`).
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            available: OnceLock::new(),
        }
    }

    fn run(&self, image: &GrayImage) -> Result<String> {
        let scratch = TempDir::new()?;
        let image_path = scratch.path().join("page.png");
        image
            .save(&image_path)
            .map_err(|e| Error::Ocr(format!("failed to write scratch image: {}", e)))?;

        let output = Command::new("tesseract")
            .arg(&image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .arg("tsv")
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => Err(Error::Ocr(format!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::Ocr(
                "tesseract not found (install tesseract-ocr)".to_string(),
            )),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            Command::new("tesseract")
                .arg("--version")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<OcrRegion>> {
        let tsv = self.run(image)?;
        parse_tsv(&tsv)
    }
}

/// Parse Tesseract TSV output into word regions.
pub fn parse_tsv(tsv: &str) -> Result<Vec<OcrRegion>> {
    let mut lines = tsv.lines();
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| Error::Ocr("empty tesseract output".to_string()))?
        .split('\t')
        .collect();

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Ocr(format!("tesseract TSV lacks column {}", name)))
    };
    let level = column("level")?;
    let left = column("left")?;
    let top = column("top")?;
    let width = column("width")?;
    let height = column("height")?;
    let text = column("text")?;

    let mut regions = Vec::new();
    for row in lines {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.get(level).map(|l| l.trim()) != Some(WORD_LEVEL) {
            continue;
        }
        let word = fields.get(text).map(|t| t.trim()).unwrap_or("");
        if word.is_empty() {
            continue;
        }
        let num = |i: usize| fields.get(i).and_then(|v| v.trim().parse::<f32>().ok());
        let (Some(x), Some(y), Some(w), Some(h)) = (num(left), num(top), num(width), num(height))
        else {
            continue;
        };
        regions.push(OcrRegion::word(word, BBox::new(x, y, x + w, y + h)));
    }

    Ok(regions)
}
