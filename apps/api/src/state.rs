use crate::config::Config;
use crate::layout::PageGeometry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Default page geometry, built from the configured preset and margin and
    /// validated at startup. Requests may override it per call.
    pub geometry: PageGeometry,
}
