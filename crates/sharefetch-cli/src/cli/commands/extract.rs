//! `sharefetch extract <archive> [--to DIR]`.

use anyhow::{Context, Result};
use sharefetch_core::extract;
use std::path::Path;

pub fn run_extract(archive: &Path, to: Option<&Path>) -> Result<()> {
    let members = extract::extract_all(archive, to)
        .with_context(|| format!("extracting {}", archive.display()))?;
    for path in members {
        println!("{}", path.display());
    }
    Ok(())
}
