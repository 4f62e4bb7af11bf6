//! Local filename derivation.
//!
//! The name of a downloaded file comes from the response's
//! `Content-Disposition` header when present, otherwise from the last segment
//! of the URL that served the payload. Either way it is sanitized so it can
//! never escape the output directory.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

/// Name used when neither the header nor the URL yields anything usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe filename for the payload served from `url`.
///
/// # Examples
///
/// - `derive_filename("https://example.com/archive.zip", None)` → `"archive.zip"`
/// - `derive_filename("https://drive.google.com/uc?id=X", Some("attachment; filename=\"report.pdf\""))` → `"report.pdf"`
pub fn derive_filename(url: &str, content_disposition: Option<&str>) -> String {
    let candidate = content_disposition
        .and_then(parse_content_disposition_filename)
        .or_else(|| filename_from_url_path(url));

    let Some(raw) = candidate else {
        return DEFAULT_FILENAME.to_string();
    };

    let sanitized = sanitize_filename(&raw);
    if sanitized.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}
