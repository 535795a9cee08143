//! Lazy depth-first walks over a sync root: hash-search candidates and folder markers.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::engine::tools::is_hidden_name;
use crate::utils::config::PackagePaths;

/// One result from a directory walk: either a path to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(DirEntry),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Keep Ok entries; log and drop errors (unreadable directories, vanished files).
fn ok_entries(iter: impl Iterator<Item = WalkOutcome>) -> impl Iterator<Item = DirEntry> {
    iter.filter_map(|outcome| match outcome {
        WalkOutcome::Ok(entry) => Some(entry),
        WalkOutcome::Err { msg, path } => {
            log::debug!(
                "walk skipped {}: {}",
                path.map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<no-path>".to_string()),
                msg
            );
            None
        }
    })
}

fn sorted_walk(root: &Path) -> WalkDir {
    WalkDir::new(root).follow_links(false).sort_by_file_name()
}

/// True for hidden entries below the root. The root itself is never filtered.
fn is_hidden_entry(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(is_hidden_name)
}

/// Regular, non-hidden files under `root`, in sorted depth-first order. Hidden directories are not entered.
/// Yields nothing when `root` does not exist.
pub fn candidate_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    let iter = sorted_walk(root)
        .into_iter()
        .filter_entry(|e| !is_hidden_entry(e))
        .map(to_outcome_walkdir);
    ok_entries(iter)
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
}

/// Folder marker files under `root`, in sorted depth-first order. Hidden directories are entered.
pub fn marker_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    let marker = PackagePaths::get().marker_filename();
    let iter = sorted_walk(root).into_iter().map(to_outcome_walkdir);
    ok_entries(iter)
        .filter(move |e| e.file_type().is_file() && e.file_name() == marker)
        .map(DirEntry::into_path)
}
