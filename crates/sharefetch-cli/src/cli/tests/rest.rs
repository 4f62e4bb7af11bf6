//! Tests for parse, extract and checksum.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_parse() {
    match parse(&["sharefetch", "parse", "https://drive.google.com/file/d/ID/view"]) {
        CliCommand::Parse { url } => assert_eq!(url, "https://drive.google.com/file/d/ID/view"),
        _ => panic!("expected Parse"),
    }
}

#[test]
fn cli_parse_extract() {
    match parse(&["sharefetch", "extract", "data.tar.gz"]) {
        CliCommand::Extract { archive, to } => {
            assert_eq!(archive, Path::new("data.tar.gz"));
            assert!(to.is_none());
        }
        _ => panic!("expected Extract"),
    }
}

#[test]
fn cli_parse_extract_to() {
    match parse(&["sharefetch", "extract", "a.zip", "--to", "/tmp/x"]) {
        CliCommand::Extract { archive, to } => {
            assert_eq!(archive, Path::new("a.zip"));
            assert_eq!(to.as_deref(), Some(Path::new("/tmp/x")));
        }
        _ => panic!("expected Extract"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["sharefetch", "checksum", "/path/to/file.iso"]) {
        CliCommand::Checksum { path } => assert_eq!(path, "/path/to/file.iso"),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["sharefetch", "status"]).is_err());
}
