//! Progress reporting for downloads.
//!
//! The downloader reports through a [`ProgressObserver`] after every chunk;
//! the CLI renders bars from it. Observers are shared by all fan-out workers
//! and are told which transfer an event belongs to by its URL.

use std::path::Path;

/// Receives progress events. Called from worker threads.
pub trait ProgressObserver: Send + Sync {
    /// The payload response arrived and its temp file is open.
    /// `total` is the `Content-Length`, when the server sent one.
    fn on_start(&self, url: &str, path: &Path, total: Option<u64>);
    /// `bytes_done` bytes of the payload have been written so far.
    fn on_progress(&self, url: &str, bytes_done: u64);
    /// The file was renamed to its final path.
    fn on_finish(&self, url: &str);
    /// The download of `url` failed; nothing more is reported for it.
    fn on_fail(&self, url: &str);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_start(&self, _url: &str, _path: &Path, _total: Option<u64>) {}
    fn on_progress(&self, _url: &str, _bytes_done: u64) {}
    fn on_finish(&self, _url: &str) {}
    fn on_fail(&self, _url: &str) {}
}
