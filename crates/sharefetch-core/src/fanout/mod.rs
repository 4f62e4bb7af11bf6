//! Fan-out: download many URLs concurrently with isolated per-item outcomes.
//!
//! Workers pull `(index, url)` pairs from a shared queue and send results back
//! over a channel; results are placed by index so the output order is the
//! input order. One item failing (or panicking) never cancels its siblings.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;

use crate::downloader::{download, DownloadOptions, DownloadResult};
use crate::error::Error;
use crate::progress::ProgressObserver;

/// Result of one item of a fan-out.
pub type Outcome = Result<DownloadResult, Error>;

/// How a batch of URLs is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downloader {
    /// Exactly one URL: run on the caller's thread.
    SingleFile,
    /// Any other count: a bounded pool of worker threads.
    MultiFile { workers: usize },
}

impl Downloader {
    /// Picks the variant for `url_count` URLs. The pool size is `max_workers`,
    /// or the available parallelism, never more than the URL count.
    pub fn for_urls(url_count: usize, max_workers: Option<usize>) -> Self {
        if url_count == 1 {
            return Downloader::SingleFile;
        }
        let configured = max_workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        Downloader::MultiFile {
            workers: configured.max(1).min(url_count),
        }
    }

    pub fn run(
        &self,
        urls: &[String],
        options: &DownloadOptions,
        progress: &dyn ProgressObserver,
    ) -> Vec<Outcome> {
        match *self {
            Downloader::SingleFile => urls
                .iter()
                .map(|url| run_item(url, options, progress))
                .collect(),
            Downloader::MultiFile { workers } => run_pool(urls, workers, options, progress),
        }
    }
}

/// Downloads every URL and returns one outcome per URL, in input order.
pub fn download_many(
    urls: &[String],
    options: &DownloadOptions,
    max_workers: Option<usize>,
    progress: &dyn ProgressObserver,
) -> Vec<Outcome> {
    let downloader = Downloader::for_urls(urls.len(), max_workers);
    tracing::debug!(urls = urls.len(), ?downloader, "dispatching downloads");
    downloader.run(urls, options, progress)
}

/// One item: errors are logged and returned, panics become `WorkerPanicked`.
fn run_item(url: &str, options: &DownloadOptions, progress: &dyn ProgressObserver) -> Outcome {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| download(url, options, progress)))
        .unwrap_or_else(|_| {
            Err(Error::WorkerPanicked {
                url: url.to_string(),
            })
        });
    if let Err(e) = &outcome {
        tracing::error!(url, "download failed: {e}");
    }
    outcome
}

fn run_pool(
    urls: &[String],
    workers: usize,
    options: &DownloadOptions,
    progress: &dyn ProgressObserver,
) -> Vec<Outcome> {
    let count = urls.len();
    if count == 0 {
        return Vec::new();
    }
    let work: Mutex<VecDeque<(usize, &str)>> =
        Mutex::new(urls.iter().map(String::as_str).enumerate().collect());
    let (tx, rx) = mpsc::channel::<(usize, Outcome)>();

    let mut slots: Vec<Option<Outcome>> = (0..count).map(|_| None).collect();
    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let work = &work;
            scope.spawn(move || loop {
                let next = work
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some((index, url)) = next else {
                    break;
                };
                if tx.send((index, run_item(url, options, progress))).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (index, outcome) in rx.iter() {
            slots[index] = Some(outcome);
        }
    });

    slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| Err(Error::WorkerPanicked { url: url.clone() }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    #[test]
    fn variant_selection() {
        assert_eq!(Downloader::for_urls(1, Some(8)), Downloader::SingleFile);
        assert_eq!(
            Downloader::for_urls(3, Some(8)),
            Downloader::MultiFile { workers: 3 }
        );
        assert_eq!(
            Downloader::for_urls(10, Some(2)),
            Downloader::MultiFile { workers: 2 }
        );
        assert_eq!(
            Downloader::for_urls(10, Some(0)),
            Downloader::MultiFile { workers: 1 }
        );
        match Downloader::for_urls(4, None) {
            Downloader::MultiFile { workers } => assert!((1..=4).contains(&workers)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let out = download_many(&[], &DownloadOptions::default(), None, &NoProgress);
        assert!(out.is_empty());
    }

    #[test]
    fn failures_are_per_item_and_ordered() {
        let opts = DownloadOptions {
            quiet: true,
            ..DownloadOptions::default()
        };
        let urls: Vec<String> = (0..3).map(|i| format!("http://127.0.0.1:1/f{i}")).collect();
        let out = download_many(&urls, &opts, Some(2), &NoProgress);
        assert_eq!(out.len(), 3);
        for (outcome, url) in out.iter().zip(&urls) {
            match outcome {
                Err(Error::Transfer { url: failed, .. }) => assert_eq!(failed, url),
                other => panic!("expected transfer error, got {other:?}"),
            }
        }
    }

    struct PanicOnStart;

    impl ProgressObserver for PanicOnStart {
        fn on_start(&self, _: &str, _: &std::path::Path, _: Option<u64>) {
            panic!("observer failure");
        }
        fn on_progress(&self, _: &str, _: u64) {}
        fn on_finish(&self, _: &str) {}
        fn on_fail(&self, _: &str) {}
    }

    #[test]
    fn panic_in_item_becomes_worker_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("local.txt");
        std::fs::write(&target, b"local").unwrap();
        let url = format!("file://{}", target.display());
        let opts = DownloadOptions {
            output: Some(dir.path().join("out")),
            quiet: true,
            ..DownloadOptions::default()
        };
        let out = download_many(&[url.clone()], &opts, None, &PanicOnStart);
        assert!(matches!(&out[0], Err(Error::WorkerPanicked { url: u }) if *u == url));
    }
}
