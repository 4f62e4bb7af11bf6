//! `sharefetch download <url>...`: download one or more URLs.

use anyhow::{bail, Result};
use serde_json::json;
use sharefetch_core::config::{self, SharefetchConfig};
use sharefetch_core::error::LinkResolutionError;
use sharefetch_core::extract;
use sharefetch_core::{download_many, DownloadOptions, Error, NoProgress, Outcome, ShareLink};
use std::path::{is_separator, Path};

use crate::cli::DownloadArgs;
use crate::progress::BarProgress;

/// Runs the downloads and prints one line (or JSON object) per URL.
/// Returns exit code 1 when any URL failed.
pub fn run_download(args: &DownloadArgs) -> Result<i32> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    validate(args)?;
    let options = build_options(&cfg, args)?;
    let workers = args.jobs.or(cfg.max_workers);
    for warning in link_warnings(args) {
        eprintln!("warning: {warning}");
    }

    let outcomes = if args.quiet || args.json {
        download_many(&args.urls, &options, workers, &NoProgress)
    } else {
        let bars = BarProgress::new();
        download_many(&args.urls, &options, workers, &bars)
    };

    let mut failed = 0usize;
    for (url, outcome) in args.urls.iter().zip(&outcomes) {
        if !report(url, outcome, args) {
            failed += 1;
        }
    }
    if failed > 0 {
        tracing::error!(failed, total = args.urls.len(), "some downloads failed");
        return Ok(1);
    }
    Ok(0)
}

/// Prints the outcome of one URL, extracting the archive when asked.
/// Returns false when this item counts as failed.
fn report(url: &str, outcome: &Outcome, args: &DownloadArgs) -> bool {
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            if args.json {
                println!("{}", json!({ "url": url, "error": e.to_string() }));
            } else {
                eprintln!("{url}: {}", failure_message(e));
            }
            return false;
        }
    };

    let extracted = if args.extract && extract::ArchiveKind::from_path(&result.output).is_some() {
        match extract::extract_all(&result.output, None) {
            Ok(members) => Some(members),
            Err(e) => {
                eprintln!("{}: extraction failed: {e}", result.output.display());
                return false;
            }
        }
    } else {
        None
    };

    if args.json {
        let mut value = serde_json::to_value(result).unwrap_or_else(|_| json!({ "url": url }));
        if let Some(members) = &extracted {
            value["extracted"] = json!(members);
        }
        println!("{value}");
    } else {
        println!("{}", result.output.display());
        for member in extracted.iter().flatten() {
            println!("  {}", member.display());
        }
    }
    true
}

/// Warnings for share links that are not direct-download links, unless `--quiet`.
fn link_warnings(args: &DownloadArgs) -> Vec<String> {
    if args.quiet {
        return Vec::new();
    }
    args.urls
        .iter()
        .filter_map(|url| ShareLink::parse(url).indirect_warning())
        .collect()
}

/// Error text for the terminal. A provider refusal gets a hint appended.
fn failure_message(e: &Error) -> String {
    match e {
        Error::Resolution(LinkResolutionError::Provider(caption)) => format!(
            "access denied: {caption}\n  You may still be able to open the file in a browser."
        ),
        other => other.to_string(),
    }
}

fn validate(args: &DownloadArgs) -> Result<()> {
    if args.urls.len() > 1 {
        if let Some(out) = &args.output {
            if !is_directory_target(out) {
                bail!(
                    "--output {} must be a directory when downloading several URLs",
                    out.display()
                );
            }
        }
        if args.sha256.is_some() {
            bail!("--sha256 can only be used with a single URL");
        }
    }
    if let Some(hex) = &args.sha256 {
        let hex = hex.trim();
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("--sha256 expects 64 hex digits");
        }
    }
    Ok(())
}

fn is_directory_target(path: &Path) -> bool {
    path.is_dir()
        || path
            .to_string_lossy()
            .chars()
            .last()
            .map(is_separator)
            .unwrap_or(false)
}

/// Config values, overridden by flags.
pub(crate) fn build_options(cfg: &SharefetchConfig, args: &DownloadArgs) -> Result<DownloadOptions> {
    let mut cfg = cfg.clone();
    if args.no_cookies {
        cfg.use_cookies = false;
    }
    let mut options = DownloadOptions::from_config(&cfg)?;
    options.output = args.output.clone();
    if let Some(proxy) = &args.proxy {
        options.proxy = Some(proxy.clone());
    }
    if args.no_check_certificate {
        options.verify_tls = false;
    }
    if let Some(ua) = &args.user_agent {
        options.user_agent = ua.clone();
    }
    options.fuzzy = args.fuzzy;
    options.quiet = args.quiet;
    options.expected_sha256 = args.sha256.clone();
    Ok(options)
}
