mod config;
mod convert;
mod errors;
mod imaging;
mod layout;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::preset_geometry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Tracing targets use the crate name with underscores, not the
            // hyphenated package name.
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Moria API v{}", env!("CARGO_PKG_VERSION"));

    // Build and validate the default page geometry up front: a bad margin
    // should fail startup, not the first conversion request.
    let geometry = preset_geometry(config.page_preset, config.page_margin_mm);
    geometry
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid page configuration: {e}"))?;
    info!(
        "Page geometry: {:?} {}x{}mm, margin {}mm",
        config.page_preset, geometry.page_width_mm, geometry.page_height_mm, geometry.margin_mm
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        geometry,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
