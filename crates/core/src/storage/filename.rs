//! Filename sanitizing and storage key generation.

use uuid::Uuid;

/// Longest filename kept, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Sanitize a client-supplied filename.
///
/// Keeps the last path component, maps anything outside
/// `[A-Za-z0-9._-]` to `_`, trims leading and trailing dots and underscores
/// and falls back to `file` when nothing is left.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let mapped: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = mapped.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return "file".to_string();
    }

    // ASCII only at this point, so any byte index is a char boundary.
    trimmed[..trimmed.len().min(MAX_FILENAME_LEN)].to_string()
}

/// Generate a collision-free storage key for a sanitized filename.
///
/// Format: `{folder}/{uuid}_{filename}`
#[must_use]
pub fn storage_key(folder: &str, sanitized: &str) -> String {
    format!("{folder}/{}_{sanitized}", Uuid::new_v4().simple())
}
