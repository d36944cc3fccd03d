//! HTTP handlers for the image-to-PDF tool.
//!
//! # Batch policy
//! `handle_convert` uses skip-with-warning: an undecodable or unsupported
//! upload is logged and counted in `X-Skipped-Count`, and the remaining files
//! proceed. A batch with no usable file at all is rejected. `handle_plan`
//! takes explicit pixel dimensions rather than opaque files, so there is
//! nothing to skip — an invalid entry aborts with 422.
//!
//! # spawn_blocking pattern
//! Decoding and PDF serialization are CPU-bound; both run via
//! `tokio::task::spawn_blocking` so the async executor stays unblocked. The
//! placement planning between them is pure arithmetic and runs inline.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    Json,
};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::convert::models::{GeometryRequest, PlanRequest, PlanResponse, PresetInfo};
use crate::errors::AppError;
use crate::imaging::{decode_image, DecodedImage};
use crate::layout::{
    build_document, preset_geometry, PageGeometry, PagePreset, DEFAULT_MARGIN_MM,
};
use crate::render::render_pdf;
use crate::state::AppState;

/// Download name served to the browser, matching the original tool's output.
const DOWNLOAD_FILE_NAME: &str = "MoriaAI-Document.pdf";
const PDF_TITLE: &str = "Moria AI Document";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/pdf/presets
pub async fn handle_presets() -> Json<Vec<PresetInfo>> {
    let presets = [PagePreset::A4, PagePreset::Letter]
        .into_iter()
        .map(|preset| {
            let (page_width_mm, page_height_mm) = preset.dimensions_mm();
            PresetInfo {
                name: preset,
                page_width_mm,
                page_height_mm,
                default_margin_mm: DEFAULT_MARGIN_MM,
            }
        })
        .collect();
    Json(presets)
}

/// POST /api/v1/pdf/plan
///
/// Runs the placement planner without rendering anything: JSON dimensions in,
/// JSON placement plan out.
pub async fn handle_plan(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    if req.images.is_empty() {
        return Err(AppError::Validation(
            "At least one image is required".to_string(),
        ));
    }
    if req.images.len() > state.config.max_images_per_request {
        return Err(AppError::Validation(format!(
            "Too many images: {} (maximum {})",
            req.images.len(),
            state.config.max_images_per_request
        )));
    }

    let geometry = resolve_geometry(&state, &req.geometry)?;
    let document = build_document(&req.images, &geometry)?;

    Ok(Json(PlanResponse {
        geometry,
        page_count: document.page_count(),
        document,
    }))
}

/// POST /api/v1/pdf/convert
///
/// Multipart upload of image files in page order; responds with PDF bytes.
pub async fn handle_convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(HeaderMap, Vec<u8>), AppError> {
    let conversion_id = Uuid::new_v4();

    // Drain the multipart stream first; decoding happens off the executor.
    let mut uploads: Vec<(String, Bytes)> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", uploads.len() + 1));
        let bytes = field.bytes().await?;
        uploads.push((file_name, bytes));
    }

    if uploads.is_empty() {
        return Err(AppError::Validation(
            "At least one image file is required".to_string(),
        ));
    }
    let upload_count = uploads.len();
    if upload_count > state.config.max_images_per_request {
        return Err(AppError::Validation(format!(
            "Too many files: {upload_count} (maximum {})",
            state.config.max_images_per_request
        )));
    }

    // Decode off the executor; skip-with-warning for unusable files.
    let (images, skipped) = tokio::task::spawn_blocking(move || decode_batch(uploads))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed decoding: {e}")))?;

    if images.is_empty() {
        return Err(AppError::Validation(format!(
            "None of the {upload_count} uploaded files could be read as JPEG, PNG, or WEBP"
        )));
    }

    // Pure planning step — inline, no blocking concerns.
    let geometry = state.geometry;
    let dims: Vec<_> = images.iter().map(|i| i.dims).collect();
    let document = build_document(&dims, &geometry)?;
    let page_count = document.page_count();

    // Serialize off the executor.
    let pdf_bytes = tokio::task::spawn_blocking(move || {
        render_pdf(&images, &document, &geometry, PDF_TITLE)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed rendering: {e}")))??;

    info!(
        %conversion_id,
        pages = page_count,
        skipped,
        bytes = pdf_bytes.len(),
        "Generated PDF document"
    );

    Ok((
        pdf_response_headers(conversion_id, page_count, skipped)?,
        pdf_bytes,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Applies the request's geometry selection over the server default.
pub(crate) fn resolve_geometry(
    state: &AppState,
    req: &GeometryRequest,
) -> Result<PageGeometry, AppError> {
    let geometry = if let Some(explicit) = req.geometry {
        explicit
    } else if let Some(preset) = req.preset {
        preset_geometry(preset, req.margin_mm.unwrap_or(DEFAULT_MARGIN_MM))
    } else {
        state.geometry
    };
    geometry.validate()?;
    Ok(geometry)
}

/// Decodes a batch, dropping unusable files with a warning.
/// Returns the decoded images (input order preserved) and the skip count.
pub(crate) fn decode_batch(uploads: Vec<(String, Bytes)>) -> (Vec<DecodedImage>, usize) {
    let mut images = Vec::with_capacity(uploads.len());
    let mut skipped = 0usize;
    for (file_name, bytes) in uploads {
        match decode_image(&bytes, &file_name) {
            Ok(decoded) => images.push(decoded),
            Err(e) => {
                skipped += 1;
                warn!(file = %file_name, error = %e, "Skipping unusable upload");
            }
        }
    }
    (images, skipped)
}

fn pdf_response_headers(
    conversion_id: Uuid,
    page_count: usize,
    skipped: usize,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("header value: {e}")))?,
    );
    for (name, value) in [
        ("x-conversion-id", conversion_id.to_string()),
        ("x-page-count", page_count.to_string()),
        ("x-skipped-count", skipped.to_string()),
    ] {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(&value)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("header value: {e}")))?,
        );
    }
    Ok(headers)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::layout::preset_geometry;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn test_state() -> AppState {
        let config = Config::default_for_tests();
        let geometry = preset_geometry(config.page_preset, config.page_margin_mm);
        AppState { config, geometry }
    }

    fn png_upload(name: &str, width: u32, height: u32) -> (String, Bytes) {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([1, 2, 3])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        (name.to_string(), Bytes::from(buf.into_inner()))
    }

    // ── resolve_geometry ────────────────────────────────────────────────────

    #[test]
    fn test_resolve_geometry_defaults_to_server_config() {
        let state = test_state();
        let g = resolve_geometry(&state, &GeometryRequest::default()).unwrap();
        assert_eq!(g, state.geometry);
    }

    #[test]
    fn test_resolve_geometry_preset_with_margin() {
        let state = test_state();
        let req = GeometryRequest {
            geometry: None,
            preset: Some(PagePreset::Letter),
            margin_mm: Some(5.0),
        };
        let g = resolve_geometry(&state, &req).unwrap();
        assert_eq!(g.page_width_mm, 215.9);
        assert_eq!(g.margin_mm, 5.0);
    }

    #[test]
    fn test_resolve_geometry_explicit_wins_over_preset() {
        let state = test_state();
        let explicit = PageGeometry {
            page_width_mm: 100.0,
            page_height_mm: 150.0,
            margin_mm: 8.0,
        };
        let req = GeometryRequest {
            geometry: Some(explicit),
            preset: Some(PagePreset::A4),
            margin_mm: None,
        };
        assert_eq!(resolve_geometry(&state, &req).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_geometry_rejects_invalid_override() {
        let state = test_state();
        let req = GeometryRequest {
            geometry: Some(PageGeometry {
                page_width_mm: 50.0,
                page_height_mm: 50.0,
                margin_mm: 30.0,
            }),
            preset: None,
            margin_mm: None,
        };
        let err = resolve_geometry(&state, &req);
        assert!(matches!(err, Err(AppError::InvalidGeometry(_))));
    }

    // ── decode_batch (skip-with-warning policy) ─────────────────────────────

    #[test]
    fn test_decode_batch_skips_bad_files_keeps_order() {
        let uploads = vec![
            png_upload("first.png", 40, 20),
            ("garbage.txt".to_string(), Bytes::from_static(b"not an image")),
            png_upload("second.png", 20, 40),
        ];
        let (images, skipped) = decode_batch(uploads);
        assert_eq!(skipped, 1);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].file_name, "first.png");
        assert_eq!(images[1].file_name, "second.png");
    }

    #[test]
    fn test_decode_batch_all_bad_yields_empty() {
        let uploads = vec![
            ("a.bin".to_string(), Bytes::from_static(b"\x00\x01\x02")),
            ("b.bin".to_string(), Bytes::from_static(b"nope")),
        ];
        let (images, skipped) = decode_batch(uploads);
        assert!(images.is_empty());
        assert_eq!(skipped, 2);
    }

    // ── plan handler ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_handle_plan_returns_ordered_pages() {
        let state = test_state();
        let req = PlanRequest {
            images: vec![
                crate::layout::ImageDims::new(1000, 500),
                crate::layout::ImageDims::new(400, 800),
            ],
            geometry: GeometryRequest::default(),
        };
        let Json(resp) = handle_plan(State(state), Json(req)).await.unwrap();
        assert_eq!(resp.page_count, 2);
        assert_eq!(resp.document.pages[0].page_index, 0);
        assert_eq!(resp.document.pages[0].placement.width_mm, 190.0);
        assert_eq!(resp.document.pages[1].placement.height_mm, 277.0);
    }

    #[tokio::test]
    async fn test_handle_plan_empty_batch_rejected() {
        let state = test_state();
        let req = PlanRequest {
            images: vec![],
            geometry: GeometryRequest::default(),
        };
        let err = handle_plan(State(state), Json(req)).await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_plan_zero_dimension_image_aborts() {
        let state = test_state();
        let req = PlanRequest {
            images: vec![crate::layout::ImageDims::new(0, 600)],
            geometry: GeometryRequest::default(),
        };
        let err = handle_plan(State(state), Json(req)).await;
        assert!(matches!(err, Err(AppError::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_handle_presets_lists_a4_and_letter() {
        let Json(presets) = handle_presets().await;
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].page_width_mm, 210.0);
        assert_eq!(presets[0].default_margin_mm, DEFAULT_MARGIN_MM);
    }
}
