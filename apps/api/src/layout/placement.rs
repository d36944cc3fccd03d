//! Placement planner — fits each image into the content box and paginates.
//!
//! # Algorithm
//! Fit-within, preserve-aspect, center: compare the image's aspect ratio to
//! the content box's. The relatively wider shape is width-constrained (target
//! width = content width, height derived); the relatively taller shape is
//! height-constrained (the mirror case). The scaled image is then centered
//! inside the content box. One dimension lands exactly on its bound and the
//! other is derived from the preserved ratio, so neither can exceed the box.
//!
//! Pure arithmetic throughout: no I/O, no hidden state, identical inputs
//! always yield bit-identical outputs. Placements for different images are
//! independent; only the final page assignment follows input order.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::geometry::PageGeometry;

// ────────────────────────────────────────────────────────────────────────────
// Input / output types
// ────────────────────────────────────────────────────────────────────────────

/// Pixel dimensions of a decoded image. Zero on either axis is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    pub fn new(width: u32, height: u32) -> Self {
        ImageDims { width, height }
    }

    /// Width-to-height ratio. Meaningful only for validated dimensions.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Where and how large one image appears on its page, in millimeters.
///
/// `x_mm`/`y_mm` are measured from the top-left corner of the page (the
/// renderer converts to the PDF's bottom-up coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub width_mm: f64,
    pub height_mm: f64,
    pub x_mm: f64,
    pub y_mm: f64,
}

/// One output page holding exactly one placed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedPage {
    /// 0-based page index, equal to the image's position in the input batch.
    pub page_index: usize,
    pub placement: Placement,
}

/// An ordered, paginated document: one page per input image, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<PlacedPage>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planner
// ────────────────────────────────────────────────────────────────────────────

/// Computes the placement of a single image inside the content box.
///
/// Scales the image to maximally fill the content area without cropping or
/// distortion, then centers it. When the image and content ratios are exactly
/// equal the image fills the box on both axes; both branches agree there.
///
/// Errors: [`AppError::InvalidImage`] for zero dimensions,
/// [`AppError::InvalidGeometry`] when the margin leaves no content area.
pub fn plan_placement(dims: ImageDims, geometry: &PageGeometry) -> Result<Placement, AppError> {
    geometry.validate()?;
    if dims.width == 0 || dims.height == 0 {
        return Err(AppError::InvalidImage(format!(
            "Image dimensions must be positive, got {} x {} px",
            dims.width, dims.height
        )));
    }

    let content_width = geometry.content_width();
    let content_height = geometry.content_height();
    let image_ratio = dims.ratio();
    let page_ratio = geometry.content_ratio();

    let (width_mm, height_mm) = if image_ratio > page_ratio {
        // Relatively wider than the content box: width-constrained.
        (content_width, content_width / image_ratio)
    } else {
        // Relatively taller or equal: height-constrained.
        (content_height * image_ratio, content_height)
    };

    Ok(Placement {
        width_mm,
        height_mm,
        x_mm: geometry.margin_mm + (content_width - width_mm) / 2.0,
        y_mm: geometry.margin_mm + (content_height - height_mm) / 2.0,
    })
}

/// Plans a whole batch: one page per image, input order preserved exactly.
///
/// An empty batch yields an empty document without error — rejecting empty
/// uploads with a user-facing message is the caller's job. Any invalid image
/// in the batch fails the call; skip-vs-abort policy belongs to the caller,
/// which filters before planning.
pub fn build_document(images: &[ImageDims], geometry: &PageGeometry) -> Result<Document, AppError> {
    geometry.validate()?;
    let mut pages = Vec::with_capacity(images.len());
    for (page_index, dims) in images.iter().enumerate() {
        let placement = plan_placement(*dims, geometry)?;
        pages.push(PlacedPage {
            page_index,
            placement,
        });
    }
    Ok(Document { pages })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
