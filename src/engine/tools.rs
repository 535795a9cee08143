//! Path and file-name utilities

use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Path as stored in the state file: relative to `root` when under it, forward slashes.
/// Paths outside the root are kept absolute.
pub fn path_to_store_string(path: &Path, root: &Path) -> String {
    let p = path_relative_to(path, root).unwrap_or_else(|| path.to_path_buf());
    p.to_string_lossy().replace('\\', "/")
}

/// Resolve a stored path string against `root`. Absolute strings are returned as is.
pub fn path_from_store_string(stored: &str, root: &Path) -> PathBuf {
    let p = PathBuf::from(stored);
    if p.is_absolute() { p } else { root.join(p) }
}

/// Dot-files and dot-directories are hidden.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Extension including the leading dot (`".pdf"`), or empty. Dot-files have no extension.
pub fn extension_with_dot(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// File name without its extension.
pub fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Folder name for a display name: path separators and control characters become `_`,
/// and a leading dot is replaced so the folder is not hidden.
pub fn folder_name(display_name: &str) -> String {
    let mut out: String = display_name
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if out.is_empty() {
        out.push('_');
    } else if out.starts_with('.') {
        out.replace_range(..1, "_");
    }
    out
}

fn allowed_in_file_name(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '_' | '.' | ' ' | '(' | ')' | '[' | 'ä' | 'ö' | 'ü' | 'Ä' | 'Ö' | 'Ü' | 'ß'
        )
}

/// Turn a display name into a file name: characters outside the allow-list (quotes and `]`
/// included) become `_`, and `extension` (with its dot) is appended.
/// A leading dot becomes `_` so the result is never a hidden file.
pub fn sanitize_file_name(display_name: &str, extension: &str) -> String {
    let mut out: String = display_name
        .chars()
        .map(|c| if allowed_in_file_name(c) { c } else { '_' })
        .collect();
    if out.is_empty() {
        out.push('_');
    } else if out.starts_with('.') {
        out.replace_range(..1, "_");
    }
    out.push_str(extension);
    out
}
