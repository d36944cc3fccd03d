//! Page geometry — physical page dimensions and the derived content box.
//!
//! All dimensions are in millimeters. The content box is the page area left
//! after subtracting the margin on all four sides; every placement computed by
//! the planner stays inside it. A geometry where the margin eats the whole
//! page is rejected up front — the layout math has no meaningful answer there.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Page presets
// ────────────────────────────────────────────────────────────────────────────

/// The recognized page size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePreset {
    /// ISO A4 — 210 × 297 mm. The only configuration of the original tool.
    A4,
    /// US letter — 215.9 × 279.4 mm.
    Letter,
}

impl PagePreset {
    /// Page dimensions in millimeters, `(width, height)`.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PagePreset::A4 => (210.0, 297.0),
            PagePreset::Letter => (215.9, 279.4),
        }
    }
}

impl std::str::FromStr for PagePreset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PagePreset::A4),
            "letter" => Ok(PagePreset::Letter),
            other => Err(AppError::Validation(format!(
                "Unknown page preset '{other}' (expected 'a4' or 'letter')"
            ))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Physical layout parameters for one output page, in millimeters.
///
/// The same margin applies to all four sides, so the content box is
/// `(page_width_mm - 2·margin_mm) × (page_height_mm - 2·margin_mm)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
}

/// Default margin applied to presets, matching the original tool's 10 mm.
pub const DEFAULT_MARGIN_MM: f64 = 10.0;

/// Returns the geometry for a preset with the given margin.
pub fn preset_geometry(preset: PagePreset, margin_mm: f64) -> PageGeometry {
    let (page_width_mm, page_height_mm) = preset.dimensions_mm();
    PageGeometry {
        page_width_mm,
        page_height_mm,
        margin_mm,
    }
}

impl PageGeometry {
    /// Usable width after margins. Meaningful only for a validated geometry.
    pub fn content_width(&self) -> f64 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    /// Usable height after margins. Meaningful only for a validated geometry.
    pub fn content_height(&self) -> f64 {
        self.page_height_mm - 2.0 * self.margin_mm
    }

    /// Width-to-height ratio of the content box.
    pub fn content_ratio(&self) -> f64 {
        self.content_width() / self.content_height()
    }

    /// Checks that the page dimensions are positive, the margin is
    /// non-negative, and the margin leaves a positive content box.
    ///
    /// No clamping is attempted — a bad geometry is an error, not something
    /// the layout math should paper over.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.page_width_mm.is_finite()
            || !self.page_height_mm.is_finite()
            || !self.margin_mm.is_finite()
        {
            return Err(AppError::InvalidGeometry(
                "Page dimensions and margin must be finite numbers".to_string(),
            ));
        }
        if self.page_width_mm <= 0.0 || self.page_height_mm <= 0.0 {
            return Err(AppError::InvalidGeometry(format!(
                "Page dimensions must be positive, got {} x {} mm",
                self.page_width_mm, self.page_height_mm
            )));
        }
        if self.margin_mm < 0.0 {
            return Err(AppError::InvalidGeometry(format!(
                "Margin must be non-negative, got {} mm",
                self.margin_mm
            )));
        }
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(AppError::InvalidGeometry(format!(
                "Margin of {} mm leaves no content area on a {} x {} mm page",
                self.margin_mm, self.page_width_mm, self.page_height_mm
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
