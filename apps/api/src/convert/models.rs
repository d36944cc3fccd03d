//! Request/response shapes for the image-to-PDF API.

use serde::{Deserialize, Serialize};

use crate::layout::{Document, ImageDims, PageGeometry, PagePreset};

/// Geometry selection for a plan or convert request. Resolution order:
/// explicit dimensions win over a preset, a preset wins over the server
/// default; `margin_mm` applies to a preset only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeometryRequest {
    pub geometry: Option<PageGeometry>,
    pub preset: Option<PagePreset>,
    pub margin_mm: Option<f64>,
}

/// POST /api/v1/pdf/plan request body.
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    /// Decoded pixel dimensions, in the order pages should appear.
    pub images: Vec<ImageDims>,
    #[serde(flatten)]
    pub geometry: GeometryRequest,
}

/// POST /api/v1/pdf/plan response body.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub geometry: PageGeometry,
    pub page_count: usize,
    pub document: Document,
}

/// One entry of GET /api/v1/pdf/presets.
#[derive(Debug, Serialize)]
pub struct PresetInfo {
    pub name: PagePreset,
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub default_margin_mm: f64,
}
