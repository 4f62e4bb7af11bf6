//! Download files shared through Google Drive-style share links.
//!
//! [`download`] fetches one URL, following the provider's confirmation pages;
//! [`download_many`] fans a list of URLs out over a worker pool. Downloads
//! stream into a `.part` file that is renamed into place only on success.

pub mod checksum;
pub mod config;
pub mod confirmation;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod fanout;
pub mod logging;
pub mod progress;
pub mod session;
pub mod share_link;
pub mod storage;
pub mod url_model;

pub use downloader::{download, DownloadOptions, DownloadResult};
pub use error::{Error, Result};
pub use fanout::{download_many, Downloader, Outcome};
pub use progress::{NoProgress, ProgressObserver};
pub use share_link::ShareLink;
