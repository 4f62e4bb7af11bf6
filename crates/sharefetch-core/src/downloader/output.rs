//! Where a payload lands on disk.

use std::fs;
use std::io;
use std::path::{is_separator, Path, PathBuf};

/// Final path for a payload named `filename`.
///
/// - no output: `filename` in the current directory
/// - an existing directory, or a path ending in a separator: `filename`
///   inside it (the directory is created when missing)
/// - anything else: the output path itself
pub(crate) fn resolve_output_path(output: Option<&Path>, filename: &str) -> io::Result<PathBuf> {
    let Some(output) = output else {
        return Ok(PathBuf::from(filename));
    };
    if output.is_dir() {
        return Ok(output.join(filename));
    }
    if ends_with_separator(output) {
        fs::create_dir_all(output)?;
        return Ok(output.join(filename));
    }
    Ok(output.to_path_buf())
}

fn ends_with_separator(path: &Path) -> bool {
    path.to_string_lossy().chars().last().map(is_separator).unwrap_or(false)
}
