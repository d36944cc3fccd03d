// Page layout engine: fit-within/preserve-aspect/center placement, one image
// per page. Pure and synchronous — decoding and PDF serialization live in the
// imaging and render modules.

pub mod geometry;
pub mod placement;

// Re-export the public API consumed by other modules (handlers, render).
pub use geometry::{preset_geometry, PageGeometry, PagePreset, DEFAULT_MARGIN_MM};
pub use placement::{build_document, plan_placement, Document, ImageDims, Placement};
