//! Streaming download of one URL.
//!
//! Resolves the share link, follows provider confirmation pages on a single
//! session (so cookies set by one page are sent with the next request), and
//! streams the payload into `<final>.part` before renaming it into place.

mod handler;
mod headers;
mod output;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SharefetchConfig;
use crate::confirmation::resolve_confirmation;
use crate::error::{LinkResolutionError, Result, SessionError};
use crate::progress::ProgressObserver;
use crate::session::{
    CookieStore, FileCookieStore, Session, SessionConfig, DEFAULT_CHUNK_SIZE, DEFAULT_USER_AGENT,
};
use crate::share_link::ShareLink;

use handler::{Exchange, ResponseHandler};

/// Confirmation pages followed before giving up.
pub const DEFAULT_MAX_CONFIRMATION_HOPS: usize = 5;

/// Per-call download settings.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Output file or directory; `None` saves into the current directory.
    pub output: Option<PathBuf>,
    pub proxy: Option<String>,
    /// Persistent cookies; `None` runs the session without a jar.
    pub cookie_store: Option<Arc<dyn CookieStore>>,
    pub verify_tls: bool,
    pub user_agent: String,
    /// Rewrite provider view links to the direct-download endpoint.
    pub fuzzy: bool,
    /// Suppress the indirect-link warning.
    pub quiet: bool,
    pub chunk_size: usize,
    pub max_confirmation_hops: usize,
    /// Hex SHA-256 the payload must match.
    pub expected_sha256: Option<String>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output: None,
            proxy: None,
            cookie_store: None,
            verify_tls: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fuzzy: false,
            quiet: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_confirmation_hops: DEFAULT_MAX_CONFIRMATION_HOPS,
            expected_sha256: None,
        }
    }
}

impl DownloadOptions {
    /// Options seeded from the config file. With `use_cookies` the jar lives
    /// at the default cache location.
    pub fn from_config(cfg: &SharefetchConfig) -> Result<Self, SessionError> {
        let cookie_store: Option<Arc<dyn CookieStore>> = if cfg.use_cookies {
            Some(Arc::new(FileCookieStore::default_location()?))
        } else {
            None
        };
        Ok(Self {
            proxy: cfg.proxy.clone(),
            cookie_store,
            verify_tls: cfg.verify_tls,
            user_agent: cfg.user_agent.clone(),
            chunk_size: cfg.chunk_size_bytes,
            max_confirmation_hops: cfg.max_confirmation_hops,
            ..Self::default()
        })
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            proxy: self.proxy.clone(),
            user_agent: self.user_agent.clone(),
            verify_tls: self.verify_tls,
            chunk_size: self.chunk_size,
        }
    }
}

/// A completed download: the file exists at `output` under its final name.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub url: String,
    pub output: PathBuf,
    pub last_modified: Option<DateTime<Utc>>,
    /// Request issue to last response header of the payload request.
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub bytes: u64,
    /// Hex digest, computed when a checksum was requested.
    pub sha256: Option<String>,
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Downloads `url` and returns where it was saved.
///
/// Any failure leaves no file under the final name and no `.part` file, and
/// is reported to `progress` through `on_fail`.
/// Cookies are written back to the store only when the download succeeded.
pub fn download(
    url: &str,
    options: &DownloadOptions,
    progress: &dyn ProgressObserver,
) -> Result<DownloadResult> {
    let result = fetch(url, options, progress);
    if result.is_err() {
        progress.on_fail(url);
    }
    result
}

fn fetch(
    url: &str,
    options: &DownloadOptions,
    progress: &dyn ProgressObserver,
) -> Result<DownloadResult> {
    let link = ShareLink::parse(url);
    if !options.quiet {
        link.warn_if_indirect();
    }
    let mut request_url = link.request_url(options.fuzzy);
    tracing::info!(url, request = %request_url, file_id = ?link.file_id(), "starting download");

    let mut session = Session::open(&options.session_config(), options.cookie_store.clone())?;
    let mut hops = 0;

    loop {
        let mut handler =
            ResponseHandler::new(url, &request_url, link.is_provider(), options, progress);
        let outcome = session.get(&request_url, &mut handler);
        let payload = match handler.finish(outcome)? {
            Exchange::Payload(payload) => payload,
            Exchange::Page(body) => {
                hops += 1;
                if hops > options.max_confirmation_hops {
                    return Err(
                        LinkResolutionError::TooManyConfirmations(options.max_confirmation_hops)
                            .into(),
                    );
                }
                let next = resolve_confirmation(&body)?;
                tracing::debug!(url, hop = hops, next = %next, "following confirmation page");
                request_url = next;
                continue;
            }
        };

        if let Err(e) = session.close() {
            tracing::warn!(url, "failed to save cookies: {e}");
        }
        tracing::info!(
            url,
            path = %payload.output.display(),
            bytes = payload.bytes,
            hops,
            "download complete"
        );
        return Ok(DownloadResult {
            url: url.to_string(),
            output: payload.output,
            last_modified: payload.last_modified,
            elapsed: payload.elapsed,
            bytes: payload.bytes,
            sha256: payload.sha256,
        });
    }
}
