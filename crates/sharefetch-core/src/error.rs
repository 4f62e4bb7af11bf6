//! Error taxonomy for link resolution, transfers and downloads.
//!
//! Each failure class has its own type so callers (and the fan-out
//! coordinator) can tell a provider refusal apart from a dead connection or a
//! full disk. [`Error`] is the per-item error returned by the public API.

use std::io;
use std::path::PathBuf;

/// The confirmation page yielded no usable URL, or the provider rendered an
/// explicit error. Never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum LinkResolutionError {
    /// Text of the provider's error caption (quota exceeded, permission denied, ...).
    #[error("{0}")]
    Provider(String),
    /// No extraction strategy matched and no error caption was present.
    #[error(
        "Cannot retrieve the public link of the file. You may need to change the \
         permission to 'Anyone with the link', or have had many accesses. \
         You may also want to try the fuzzy mode (--fuzzy)."
    )]
    NoLink,
    /// The confirmation page pointed at something other than an http(s) URL.
    #[error("confirmation page links to an unsupported URL: {0}")]
    UnsupportedLink(String),
    /// The provider kept answering with confirmation pages.
    #[error("gave up after {0} confirmation pages")]
    TooManyConfirmations(usize),
}

/// Connectivity failure on the initial request: transport error or non-2xx status.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error(transparent)]
    Curl(#[from] curl::Error),
    #[error("HTTP {status}")]
    Http { status: u32 },
}

/// Failure after streaming began. The temporary file is removed before this
/// error reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("storage: {0}")]
    Io(#[from] io::Error),
    #[error("transfer interrupted: {0}")]
    Interrupted(#[source] curl::Error),
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Session setup or cookie jar persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    #[error("cookie jar {}: {source}", path.display())]
    CookieJar {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

/// Archive extraction failure.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported archive format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("archive I/O: {0}")]
    Io(#[from] io::Error),
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Per-item error of a download.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolution(#[from] LinkResolutionError),
    #[error("failed to retrieve file from {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: TransferError,
    },
    #[error("download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: DownloadError,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("worker panicked while downloading {url}")]
    WorkerPanicked { url: String },
}

impl Error {
    pub(crate) fn transfer(url: &str, source: impl Into<TransferError>) -> Self {
        Error::Transfer {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn download(url: &str, source: impl Into<DownloadError>) -> Self {
        Error::Download {
            url: url.to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
