//! Path patterns of provider "view/edit" links.

use regex::Regex;
use std::sync::OnceLock;

/// Checked in order; the first capture group is the file identifier.
const PATH_PATTERNS: [&str; 8] = [
    r"^/file/d/(.*?)/(edit|view)$",
    r"^/file/u/[0-9]+/d/(.*?)/(edit|view)$",
    r"^/document/d/(.*?)/(edit|htmlview|view)$",
    r"^/document/u/[0-9]+/d/(.*?)/(edit|htmlview|view)$",
    r"^/presentation/d/(.*?)/(edit|htmlview|view)$",
    r"^/presentation/u/[0-9]+/d/(.*?)/(edit|htmlview|view)$",
    r"^/spreadsheets/d/(.*?)/(edit|htmlview|view)$",
    r"^/spreadsheets/u/[0-9]+/d/(.*?)/(edit|htmlview|view)$",
];

fn compiled() -> &'static [Regex] {
    static R: OnceLock<Vec<Regex>> = OnceLock::new();
    R.get_or_init(|| {
        PATH_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("compile share link path pattern"))
            .collect()
    })
}

/// Returns the identifier captured by the first matching pattern.
pub(super) fn file_id_from_path(path: &str) -> Option<String> {
    compiled()
        .iter()
        .find_map(|re| re.captures(path))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
