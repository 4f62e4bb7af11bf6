//! CLI command handlers. Each command is in its own file.

mod checksum;
mod download;
mod extract;
mod parse;

pub use checksum::run_checksum;
pub use download::run_download;
pub use extract::run_extract;
pub use parse::run_parse;
