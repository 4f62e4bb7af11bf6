//! Parse HTTP response header lines into [`ResponseMeta`].

use chrono::{DateTime, Utc};

/// Headers of the final response that matter to the downloader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseMeta {
    pub status: Option<u32>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub last_modified: Option<String>,
}

impl ResponseMeta {
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .eq_ignore_ascii_case("text/html")
            })
            .unwrap_or(false)
    }

    pub fn last_modified_utc(&self) -> Option<DateTime<Utc>> {
        self.last_modified.as_deref().and_then(parse_http_date)
    }
}

/// Parse one header block (status line first) into `ResponseMeta`.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseMeta {
    let mut meta = ResponseMeta {
        status: parse_http_status(lines),
        ..ResponseMeta::default()
    };

    for line in lines {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            meta.content_length = value.parse::<u64>().ok();
        } else if name.eq_ignore_ascii_case("content-type") {
            meta.content_type = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("content-disposition") {
            meta.content_disposition = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("last-modified") {
            meta.last_modified = Some(value.to_string());
        }
    }

    meta
}

/// Status code from the `HTTP/x y reason` line, if the block starts with one.
pub(crate) fn parse_http_status(lines: &[String]) -> Option<u32> {
    let first = lines.first()?;
    if !first.starts_with("HTTP/") {
        return None;
    }
    first.split_whitespace().nth(1)?.parse().ok()
}

/// RFC 2822 / HTTP-date (`Wed, 21 Oct 2015 07:28:00 GMT`) to UTC.
pub(crate) fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
