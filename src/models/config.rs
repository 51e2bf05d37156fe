//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_page_size() -> usize {
    10
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Signing key for flash message cookies (at least 64 bytes).
    pub secret: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}
