//! CLI for sharefetch.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_download, run_extract, run_parse};

/// Top-level CLI for sharefetch.
#[derive(Debug, Parser)]
#[command(name = "sharefetch")]
#[command(about = "Download files from Google Drive share links and plain URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one or more URLs.
    Download(DownloadArgs),

    /// Show the file id and direct-link flag of a share URL.
    Parse {
        /// Share URL.
        url: String,
    },

    /// Extract a .zip, .tar, .tar.gz/.tgz or .tar.bz2/.tbz archive.
    Extract {
        /// Path to the archive.
        archive: PathBuf,
        /// Target directory (default: the archive's directory).
        #[arg(long, value_name = "DIR")]
        to: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// URLs to download (share links or direct HTTP/HTTPS URLs).
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Output file, or directory (existing, or ending in '/').
    #[arg(short = 'O', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Proxy URL, e.g. http://127.0.0.1:3128 or socks5h://localhost:1080.
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Do not load or save the cookie jar.
    #[arg(long)]
    pub no_cookies: bool,

    /// Skip TLS certificate verification.
    #[arg(long)]
    pub no_check_certificate: bool,

    /// User agent to send.
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Rewrite view/edit share links to the direct-download endpoint.
    #[arg(long)]
    pub fuzzy: bool,

    /// No progress bars or link warnings.
    #[arg(short, long)]
    pub quiet: bool,

    /// Download up to N URLs concurrently (default: config, else CPU count).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Expected SHA-256 (hex) of the payload; only with a single URL.
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,

    /// Extract downloaded archives next to them.
    #[arg(long)]
    pub extract: bool,

    /// Print one JSON object per URL instead of plain text.
    #[arg(long)]
    pub json: bool,
}

impl CliCommand {
    /// Parses the command line and runs the command. Returns the process exit code.
    pub fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        match cli.command {
            CliCommand::Download(args) => run_download(&args),
            CliCommand::Parse { url } => run_parse(&url).map(|()| 0),
            CliCommand::Extract { archive, to } => run_extract(&archive, to.as_deref()).map(|()| 0),
            CliCommand::Checksum { path } => {
                run_checksum(std::path::Path::new(&path)).map(|()| 0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
