//! Tag overlays drawn on the source document.
//!
//! Every tagged word gets an outline in its tag's color. PDF sources get an
//! extra content stream per page; images are redrawn and re-encoded in their
//! own format.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::Object;

use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use crate::extract::pdf::LopdfBackend;
use crate::model::{BBox, Document, NerTag, Page};

/// Outline width on raster images, in pixels.
const IMAGE_STROKE: u32 = 2;

/// Outline width on PDF pages, in points.
const PDF_STROKE: f32 = 1.0;

/// Overlay color of a tag; untagged and unlisted tags are not drawn.
pub fn tag_color(tag: &NerTag) -> Option<[u8; 3]> {
    let rgb = match tag {
        NerTag::Hardskill => [128, 0, 128],
        NerTag::Softskill => [255, 165, 0],
        NerTag::Education => [0, 255, 0],
        NerTag::Experience => [0, 0, 255],
        NerTag::Language => [139, 69, 19],
        NerTag::Project => [255, 255, 0],
        NerTag::Email => [255, 0, 255],
        NerTag::Phone => [255, 0, 0],
        NerTag::Address => [0, 255, 255],
        NerTag::Name => [255, 20, 147],
        _ => return None,
    };
    Some(rgb)
}

/// Word boxes of a page grouped by overlay color, in first-seen color order.
fn colored_boxes(page: &Page) -> Vec<([u8; 3], Vec<BBox>)> {
    let mut groups: Vec<([u8; 3], Vec<BBox>)> = Vec::new();
    for word in page.iter_words() {
        let Some(color) = tag_color(&word.ner_tag) else {
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == color) {
            Some((_, boxes)) => boxes.push(word.bbox),
            None => groups.push((color, vec![word.bbox])),
        }
    }
    groups
}

/// Draw the tag overlay of `doc` on its source file and return the encoded
/// result (PDF, PNG or JPEG, matching the source).
pub fn visualize(doc: &Document, source: &Path) -> Result<Vec<u8>> {
    let format = SourceFormat::from_path(source).ok_or_else(|| {
        Error::UnsupportedFormat(format!("cannot visualize {}", source.display()))
    })?;
    let data = std::fs::read(source)?;

    match format {
        SourceFormat::Pdf => visualize_pdf(doc, &data),
        SourceFormat::Png => visualize_image(doc, &data, ImageFormat::Png),
        SourceFormat::Jpeg => visualize_image(doc, &data, ImageFormat::Jpeg),
    }
}

/// Draw the overlay and write it to `output`.
pub fn write_visualization<P: AsRef<Path>>(
    doc: &Document,
    source: &Path,
    output: P,
) -> Result<()> {
    let bytes = visualize(doc, source)?;
    std::fs::write(output.as_ref(), bytes)?;
    log::info!("Visualization written to {}", output.as_ref().display());
    Ok(())
}

/// Append a stroke overlay to each page of a PDF.
pub fn visualize_pdf(doc: &Document, data: &[u8]) -> Result<Vec<u8>> {
    let backend = LopdfBackend::load_bytes(data)?;
    let pages: Vec<_> = backend.pages().into_values().collect();
    let boxes: Vec<[f32; 4]> = pages.iter().map(|id| backend.media_box(*id)).collect();
    let mut pdf = backend.into_inner();

    for ((page, page_id), [llx, _lly, _urx, ury]) in doc.pages.iter().zip(pages).zip(boxes) {
        let mut operations = vec![Operation::new("q", vec![])];
        operations.push(Operation::new("w", vec![Object::Real(PDF_STROKE)]));
        for (color, rects) in colored_boxes(page) {
            let [r, g, b] = color.map(|c| f32::from(c) / 255.0);
            operations.push(Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]));
            for rect in rects {
                // Word boxes are top-left; PDF user space is bottom-left.
                operations.push(Operation::new(
                    "re",
                    vec![
                        Object::Real(rect.x0 + llx),
                        Object::Real(ury - rect.y1),
                        Object::Real(rect.width()),
                        Object::Real(rect.height()),
                    ],
                ));
                operations.push(Operation::new("S", vec![]));
            }
        }
        operations.push(Operation::new("Q", vec![]));

        let content = Content { operations }
            .encode()
            .map_err(|e| Error::Render(format!("cannot encode overlay: {}", e)))?;
        pdf.add_page_contents(page_id, content).map_err(|e| {
            Error::Render(format!("cannot add overlay to page {}: {}", page.number, e))
        })?;
    }

    let mut out = Vec::new();
    pdf.save_to(&mut out)
        .map_err(|e| Error::Render(format!("cannot write PDF: {}", e)))?;
    Ok(out)
}

/// Draw 2-pixel outlines on an image and re-encode it.
pub fn visualize_image(doc: &Document, data: &[u8], format: ImageFormat) -> Result<Vec<u8>> {
    let mut image = image::load_from_memory(data)?.to_rgb8();
    if let Some(page) = doc.pages.first() {
        for (color, rects) in colored_boxes(page) {
            for rect in rects {
                draw_outline(&mut image, &rect, Rgb(color), IMAGE_STROKE);
            }
        }
    }

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut out, format)
        .map_err(|e| Error::Render(format!("cannot encode image: {}", e)))?;
    Ok(out.into_inner())
}

/// Stroke a rectangle inside its bounds, clipped to the image.
pub fn draw_outline(image: &mut RgbImage, rect: &BBox, color: Rgb<u8>, stroke: u32) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min((max - 1) as f32) as u32 };
    let (x0, x1) = (clamp(rect.x0, width), clamp(rect.x1, width));
    let (y0, y1) = (clamp(rect.y0, height), clamp(rect.y1, height));

    for y in y0..=y1 {
        for x in x0..=x1 {
            let on_edge = x < x0 + stroke
                || x + stroke > x1
                || y < y0 + stroke
                || y + stroke > y1;
            if on_edge {
                image.put_pixel(x, y, color);
            }
        }
    }
}
