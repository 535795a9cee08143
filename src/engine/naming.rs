//! Collision-free file and folder names.

use std::path::{Path, PathBuf};

use super::tools::{extension_with_dot, file_stem_lossy};
use crate::utils::config::LOCAL_COPY_INFIX;

/// Return `desired` if nothing exists there, else the first free `<stem>-N<ext>` for N = 1, 2, …
///
/// Only checks existence at call time; a single writer is assumed.
pub fn conflict_free_name(desired: &Path) -> PathBuf {
    if !exists(desired) {
        return desired.to_path_buf();
    }
    let parent = desired.parent().unwrap_or(Path::new(""));
    let stem = file_stem_lossy(desired);
    let ext = extension_with_dot(desired);
    (1..)
        .map(|i| parent.join(format!("{stem}-{i}{ext}")))
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| desired.to_path_buf())
}

/// Where a locally edited file is set aside: `<stem>.local<ext>` next to it, made conflict-free.
pub fn local_copy_name(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = file_stem_lossy(path);
    let ext = extension_with_dot(path);
    conflict_free_name(&parent.join(format!("{stem}{LOCAL_COPY_INFIX}{ext}")))
}

/// Dangling symlinks count as taken.
fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
