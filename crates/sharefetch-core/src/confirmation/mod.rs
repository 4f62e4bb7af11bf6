//! Confirmation-page resolution.
//!
//! Providers answer large or rate-limited downloads with an interstitial page
//! instead of the file. The page comes in several shapes (a download anchor,
//! a form carrying a confirmation token, an embedded JSON field); each shape
//! has its own extraction strategy in [`strategies`].
//!
//! The body is scanned once, top to bottom, line by line. On each line the
//! provider's error caption is checked first, then the strategies in priority
//! order. Whatever matches on the earliest line decides the outcome, so an
//! error caption that appears after a usable link is never reported.
//! The matched link must be an absolute http(s) URL.

mod html;
mod strategies;

use url::Url;

use crate::error::LinkResolutionError;

/// Extracts the real download URL from a confirmation page body.
pub fn resolve_confirmation(body: &str) -> Result<String, LinkResolutionError> {
    for (line_no, line) in body.lines().enumerate() {
        if let Some(caption) = strategies::error_caption(line) {
            tracing::debug!(line = line_no + 1, "provider error caption found");
            return Err(LinkResolutionError::Provider(caption));
        }
        for (name, strategy) in strategies::STRATEGIES.iter() {
            if let Some(url) = strategy(line) {
                tracing::debug!(strategy = name, line = line_no + 1, "confirmation link found");
                return check_scheme(url);
            }
        }
    }
    Err(LinkResolutionError::NoLink)
}

fn check_scheme(url: String) -> Result<String, LinkResolutionError> {
    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(url),
        _ => Err(LinkResolutionError::UnsupportedLink(url)),
    }
}
