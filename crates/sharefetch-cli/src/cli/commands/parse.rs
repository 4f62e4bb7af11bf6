//! `sharefetch parse <url>`: show what the link resolver sees.

use anyhow::Result;
use sharefetch_core::ShareLink;

pub fn run_parse(url: &str) -> Result<()> {
    let link = ShareLink::parse(url);
    println!("file id:   {}", link.file_id().unwrap_or("-"));
    println!("direct:    {}", link.is_direct());
    println!("provider:  {}", link.is_provider());
    if let Some(canonical) = link.canonical_download_url() {
        println!("download:  {canonical}");
    }
    Ok(())
}
