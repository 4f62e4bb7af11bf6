//! Filename sanitization.

/// Longest file name most filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Makes a header- or URL-supplied name safe to join onto an output directory.
///
/// - NUL, `/`, `\` and control characters become `_`
/// - leading/trailing spaces and dots are trimmed
/// - the result is cut to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');

    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
