//! Configuration file: `~/.config/sharefetch/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::downloader::DEFAULT_MAX_CONFIRMATION_HOPS;
use crate::session::{DEFAULT_CHUNK_SIZE, DEFAULT_USER_AGENT};

/// Global configuration. Every key is optional in the file; missing keys take
/// the defaults below. Command-line flags override these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharefetchConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Default proxy URL (e.g. `http://127.0.0.1:3128`).
    pub proxy: Option<String>,
    /// Load and save the cookie jar under the XDG cache directory.
    pub use_cookies: bool,
    /// Verify TLS certificates.
    pub verify_tls: bool,
    /// Streaming chunk size in bytes.
    pub chunk_size_bytes: usize,
    /// Fan-out worker threads (None = available parallelism).
    pub max_workers: Option<usize>,
    /// Confirmation pages followed before giving up.
    pub max_confirmation_hops: usize,
}

impl Default for SharefetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            use_cookies: true,
            verify_tls: true,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            max_workers: None,
            max_confirmation_hops: DEFAULT_MAX_CONFIRMATION_HOPS,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sharefetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SharefetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SharefetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SharefetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
