//! Share link parsing.
//!
//! Recognizes provider links by host, extracts the file identifier from the
//! `id` query parameter or from a "view/edit" path, and tells whether the URL
//! already points at the direct-download endpoint. Links from any other host
//! are downloaded as-is.

mod patterns;

use url::Url;

/// Hosts whose links carry a provider file identifier.
pub const PROVIDER_HOSTS: [&str; 2] = ["drive.google.com", "docs.google.com"];

/// Path suffix of the provider's direct-download endpoint.
const DOWNLOAD_ENDPOINT_SUFFIX: &str = "/uc";

/// Canonical direct-download URL; the identifier goes in the `id` parameter.
const CANONICAL_DOWNLOAD_URL: &str = "https://drive.google.com/uc";

/// A parsed share URL. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    raw: String,
    file_id: Option<String>,
    is_direct: bool,
    is_provider: bool,
}

impl ShareLink {
    /// Parses `url`. Never fails: an unparseable URL is simply not a provider link.
    pub fn parse(url: &str) -> Self {
        let raw = url.to_string();
        let Ok(parsed) = Url::parse(url) else {
            return Self {
                raw,
                file_id: None,
                is_direct: false,
                is_provider: false,
            };
        };

        let is_direct = parsed.path().ends_with(DOWNLOAD_ENDPOINT_SUFFIX);
        let is_provider = parsed
            .host_str()
            .map(|h| PROVIDER_HOSTS.contains(&h))
            .unwrap_or(false);
        if !is_provider {
            return Self {
                raw,
                file_id: None,
                is_direct,
                is_provider,
            };
        }

        // Blank values are ignored, so `?id=` falls through to the path table.
        let ids: Vec<String> = parsed
            .query_pairs()
            .filter(|(k, v)| k == "id" && !v.is_empty())
            .map(|(_, v)| v.into_owned())
            .collect();
        let file_id = match ids.len() {
            0 => patterns::file_id_from_path(parsed.path()),
            1 => ids.into_iter().next(),
            _ => None,
        };

        Self {
            raw,
            file_id,
            is_direct,
            is_provider,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Provider file identifier, if the link is a recognized provider link.
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// True when the URL path already ends in the direct-download endpoint.
    pub fn is_direct(&self) -> bool {
        self.is_direct
    }

    /// True when the host is one of [`PROVIDER_HOSTS`].
    pub fn is_provider(&self) -> bool {
        self.is_provider
    }

    /// `https://drive.google.com/uc?id=<id>` for provider links with an identifier.
    pub fn canonical_download_url(&self) -> Option<String> {
        let id = self.file_id.as_deref()?;
        let mut url = Url::parse(CANONICAL_DOWNLOAD_URL).ok()?;
        url.query_pairs_mut().append_pair("id", id);
        Some(url.into())
    }

    /// URL to request first: the canonical endpoint in fuzzy mode, else the link itself.
    pub fn request_url(&self, fuzzy: bool) -> String {
        if fuzzy && self.is_provider && !self.is_direct {
            if let Some(url) = self.canonical_download_url() {
                return url;
            }
        }
        self.raw.clone()
    }

    /// User-facing warning for a provider link that is not the
    /// direct-download endpoint; `None` for direct and non-provider links.
    pub fn indirect_warning(&self) -> Option<String> {
        if !self.is_provider || self.is_direct {
            return None;
        }
        Some(match self.canonical_download_url() {
            Some(suggested) => format!(
                "{} is not a direct download link. Try --fuzzy or the following URL: {suggested}",
                self.raw
            ),
            None => format!(
                "{} is not a direct download link and carries no file id",
                self.raw
            ),
        })
    }

    /// Logs [`indirect_warning`](Self::indirect_warning), if any.
    pub fn warn_if_indirect(&self) {
        if let Some(msg) = self.indirect_warning() {
            tracing::warn!(url = %self.raw, "{msg}");
        }
    }
}

/// Returns `(file_id, is_direct)` for `url`.
pub fn resolve(url: &str) -> (Option<String>, bool) {
    let link = ShareLink::parse(url);
    (link.file_id, link.is_direct)
}
