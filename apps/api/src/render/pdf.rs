//! PDF serialization — embeds each decoded image at its planned placement.
//!
//! This is the collaborator downstream of the layout engine: it takes the
//! placement numbers as given and only translates them into printpdf calls.
//! Two coordinate quirks live here and nowhere else:
//! - the planner measures y from the top of the page, printpdf from the
//!   bottom, so the offset is flipped;
//! - printpdf sizes an embedded bitmap as `pixels / dpi`, so the transform
//!   DPI is chosen to make the bitmap exactly fill the planned millimeter
//!   box (aspect is already preserved, one DPI serves both axes).
//!
//! CPU-bound — handlers call this inside `tokio::task::spawn_blocking`.

use printpdf::{Image, ImageTransform, Mm, PdfDocument};

use crate::errors::AppError;
use crate::imaging::DecodedImage;
use crate::layout::{Document, PageGeometry, Placement};

const MM_PER_INCH: f64 = 25.4;

/// Renders a planned document to PDF bytes, one page per placed image.
///
/// `images` must be the same batch, in the same order, that produced
/// `document`. An empty document is rejected — callers validate the batch
/// before planning.
pub fn render_pdf(
    images: &[DecodedImage],
    document: &Document,
    geometry: &PageGeometry,
    title: &str,
) -> Result<Vec<u8>, AppError> {
    if document.pages.is_empty() {
        return Err(AppError::Validation(
            "Cannot render a document with zero pages".to_string(),
        ));
    }
    if images.len() != document.page_count() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Placement plan has {} pages but {} images were supplied",
            document.page_count(),
            images.len()
        )));
    }

    let page_width = Mm(geometry.page_width_mm as f32);
    let page_height = Mm(geometry.page_height_mm as f32);

    let (doc, first_page, first_layer) = PdfDocument::new(title, page_width, page_height, "Layer 1");
    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    for (decoded, placed) in images.iter().zip(document.pages.iter()) {
        if placed.page_index > 0 {
            let (page, layer_idx) = doc.add_page(page_width, page_height, "Layer 1");
            layer = doc.get_page(page).get_layer(layer_idx);
        }

        // Flatten any alpha channel — PDF image XObjects carry no alpha here.
        let rgb = image::DynamicImage::ImageRgb8(decoded.bitmap.to_rgb8());
        let pdf_image = Image::from_dynamic_image(&rgb);

        pdf_image.add_to_layer(
            layer.clone(),
            placement_transform(&placed.placement, geometry, decoded),
        );
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Pdf(format!("Failed to serialize PDF: {e}")))
}

/// Converts one planner placement into a printpdf image transform.
fn placement_transform(
    placement: &Placement,
    geometry: &PageGeometry,
    image: &DecodedImage,
) -> ImageTransform {
    // dpi such that `width_px / dpi * 25.4 == width_mm`; the planner preserved
    // the aspect ratio, so the height lands on its target with the same dpi.
    let dpi = image.dims.width as f64 * MM_PER_INCH / placement.width_mm;

    // Top-down y offset → bottom-up translate of the image's lower edge.
    let translate_y = geometry.page_height_mm - placement.y_mm - placement.height_mm;

    ImageTransform {
        translate_x: Some(Mm(placement.x_mm as f32)),
        translate_y: Some(Mm(translate_y as f32)),
        dpi: Some(dpi as f32),
        ..Default::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
