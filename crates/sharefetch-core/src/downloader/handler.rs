//! curl Handler for one request of a download.
//!
//! Header lines are collected per response block (reset on each `HTTP/` status
//! line, so redirects and proxy CONNECT replies are discarded). On the first
//! body chunk the handler decides what the body is: an error response (the
//! transfer is aborted), a confirmation page (buffered in memory) or the
//! payload (streamed into a `.part` file).

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use curl::easy::{Handler, WriteError};

use super::headers::{self, ResponseMeta};
use super::output::resolve_output_path;
use super::DownloadOptions;
use crate::checksum::{digest_matches, Sha256Stream};
use crate::error::{DownloadError, Error, TransferError};
use crate::progress::ProgressObserver;
use crate::storage::{temp_path, PartFile};
use crate::url_model::derive_filename;

/// What one request produced.
#[derive(Debug)]
pub(super) enum Exchange {
    /// A confirmation page to resolve.
    Page(String),
    /// The payload, fully written and renamed.
    Payload(Payload),
}

#[derive(Debug)]
pub(super) struct Payload {
    pub output: PathBuf,
    pub bytes: u64,
    pub sha256: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub elapsed: Duration,
}

enum Body {
    /// No body chunk seen yet.
    Pending,
    /// Non-2xx response; the transfer is aborted on the first chunk.
    Rejected,
    Page(Vec<u8>),
    File { part: PartFile, final_path: PathBuf },
}

pub(super) struct ResponseHandler<'a> {
    /// The URL the caller asked for; keys progress events and download errors.
    url: &'a str,
    /// The URL of this request.
    request_url: &'a str,
    /// Whether a provider confirmation page may be served instead of the file.
    confirmable: bool,
    options: &'a DownloadOptions,
    progress: &'a dyn ProgressObserver,
    started: Instant,
    headers_elapsed: Option<Duration>,
    header_lines: Vec<String>,
    body: Body,
    hasher: Option<Sha256Stream>,
    io_error: Option<io::Error>,
}

impl<'a> ResponseHandler<'a> {
    pub(super) fn new(
        url: &'a str,
        request_url: &'a str,
        confirmable: bool,
        options: &'a DownloadOptions,
        progress: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            url,
            request_url,
            confirmable,
            options,
            progress,
            started: Instant::now(),
            headers_elapsed: None,
            header_lines: Vec::new(),
            body: Body::Pending,
            hasher: options.expected_sha256.as_ref().map(|_| Sha256Stream::new()),
            io_error: None,
        }
    }

    fn meta(&self) -> ResponseMeta {
        headers::parse_headers(&self.header_lines)
    }

    /// Decides what the body is, from the headers of the final response.
    fn open_body(&mut self) -> io::Result<Body> {
        let meta = self.meta();
        let status = meta.status.unwrap_or(200);
        if !(200..300).contains(&status) {
            return Ok(Body::Rejected);
        }
        if self.confirmable && meta.content_disposition.is_none() && meta.is_html() {
            tracing::debug!(url = self.request_url, "response is a confirmation page");
            return Ok(Body::Page(Vec::new()));
        }

        let filename = derive_filename(self.request_url, meta.content_disposition.as_deref());
        let final_path = resolve_output_path(self.options.output.as_deref(), &filename)?;
        let part = PartFile::create(&temp_path(&final_path), self.options.chunk_size)?;
        tracing::debug!(
            url = self.url,
            path = %final_path.display(),
            total = ?meta.content_length,
            "streaming payload"
        );
        self.progress
            .on_start(self.url, &final_path, meta.content_length);
        Ok(Body::File { part, final_path })
    }

    fn store_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        match &mut self.body {
            Body::Page(buf) => buf.extend_from_slice(data),
            Body::File { part, .. } => {
                part.write_chunk(data)?;
                if let Some(h) = self.hasher.as_mut() {
                    h.update(data);
                }
                self.progress.on_progress(self.url, part.bytes_written());
            }
            Body::Pending | Body::Rejected => {}
        }
        Ok(())
    }

    /// Turns the outcome of `Session::get` into the exchange result. Dropping
    /// the handler on an error path removes any temp file it created.
    pub(super) fn finish(mut self, outcome: Result<u32, curl::Error>) -> Result<Exchange, Error> {
        let meta = self.meta();

        if let Body::Rejected = self.body {
            let status = meta.status.or_else(|| outcome.as_ref().ok().copied()).unwrap_or(0);
            return Err(Error::transfer(self.request_url, TransferError::Http { status }));
        }

        let status = match outcome {
            Ok(status) => status,
            Err(e) => {
                if let Some(io_err) = self.io_error.take() {
                    return Err(Error::download(self.url, io_err));
                }
                return Err(match self.body {
                    Body::File { .. } => Error::download(self.url, DownloadError::Interrupted(e)),
                    _ => Error::transfer(self.request_url, e),
                });
            }
        };
        if !(200..300).contains(&status) {
            return Err(Error::transfer(self.request_url, TransferError::Http { status }));
        }

        // Empty 2xx body: no write callback ran.
        if let Body::Pending = self.body {
            self.body = self.open_body().map_err(|e| Error::download(self.url, e))?;
        }

        let elapsed = self.headers_elapsed.unwrap_or_else(|| self.started.elapsed());
        match std::mem::replace(&mut self.body, Body::Pending) {
            Body::Page(buf) => Ok(Exchange::Page(String::from_utf8_lossy(&buf).into_owned())),
            Body::File { part, final_path } => {
                let bytes = part.bytes_written();
                let sha256 = self.hasher.take().map(Sha256Stream::finish);
                if let (Some(expected), Some(actual)) = (&self.options.expected_sha256, &sha256) {
                    if !digest_matches(expected, actual) {
                        return Err(Error::download(
                            self.url,
                            DownloadError::ChecksumMismatch {
                                expected: expected.trim().to_ascii_lowercase(),
                                actual: actual.clone(),
                            },
                        ));
                    }
                }
                part.finalize(&final_path)
                    .map_err(|e| Error::download(self.url, e))?;
                self.progress.on_finish(self.url);
                Ok(Exchange::Payload(Payload {
                    output: final_path,
                    bytes,
                    sha256,
                    last_modified: meta.last_modified_utc(),
                    elapsed,
                }))
            }
            Body::Pending | Body::Rejected => Err(Error::transfer(
                self.request_url,
                TransferError::Http { status },
            )),
        }
    }
}

impl Handler for ResponseHandler<'_> {
    fn header(&mut self, data: &[u8]) -> bool {
        let line = String::from_utf8_lossy(data);
        let line = line.trim_end();
        if line.starts_with("HTTP/") {
            self.header_lines.clear();
        }
        if line.is_empty() {
            // End of a header block; the last one belongs to the final response.
            self.headers_elapsed = Some(self.started.elapsed());
        } else {
            self.header_lines.push(line.to_string());
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if let Body::Pending = self.body {
            match self.open_body() {
                Ok(body) => self.body = body,
                Err(e) => {
                    self.io_error = Some(e);
                    return Ok(0);
                }
            }
        }
        if let Body::Rejected = self.body {
            return Ok(0);
        }
        match self.store_chunk(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                self.io_error = Some(e);
                Ok(0)
            }
        }
    }
}
