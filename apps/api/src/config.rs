use anyhow::{Context, Result};

use crate::layout::{PagePreset, DEFAULT_MARGIN_MM};

/// Application configuration loaded from environment variables.
/// Every knob has a default; a malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Page preset used when a request does not override the geometry.
    pub page_preset: PagePreset,
    pub page_margin_mm: f64,
    pub max_images_per_request: usize,
    /// Request body cap for multipart uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_parsed("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            page_preset: match std::env::var("PAGE_PRESET") {
                Ok(raw) => raw
                    .parse::<PagePreset>()
                    .map_err(|e| anyhow::anyhow!("PAGE_PRESET: {e}"))?,
                Err(_) => PagePreset::A4,
            },
            page_margin_mm: env_parsed("PAGE_MARGIN_MM", DEFAULT_MARGIN_MM)?,
            max_images_per_request: env_parsed("MAX_IMAGES_PER_REQUEST", 50)?,
            max_upload_bytes: env_parsed("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn default_for_tests() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            page_preset: PagePreset::A4,
            page_margin_mm: DEFAULT_MARGIN_MM,
            max_images_per_request: 50,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

fn env_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
