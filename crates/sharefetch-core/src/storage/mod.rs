//! Disk side of a download: the `.part` temp file and its atomic finalize.
//!
//! Bytes are streamed into `<final>.part`; only a fully written, synced file is
//! renamed onto the final path. A [`PartFile`] that is dropped without being
//! finalized deletes its temp file, so failures and panics never leave a
//! truncated file under the final name.

mod part_file;

pub use part_file::PartFile;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
