//! Public and internal types for the campsync API and orchestrator.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::RootDefaults;

/// One tracked remote item: last-known remote fingerprint, local content hash and local path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    /// Remote content signature; `None` when the remote does not provide one.
    pub fingerprint: Option<String>,
    /// Hex blake3 digest of the local file as of the last reconciliation.
    pub hash: String,
    /// Absolute path where the file was last known to live. May be stale.
    pub path: PathBuf,
}

/// Local state of one remote item, recomputed on every reconciliation. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryStatus {
    pub entry_exists: bool,
    pub file_exists: bool,
    pub file_path: Option<PathBuf>,
    /// `None` when there is no entry to compare against.
    pub changed_on_remote: Option<bool>,
    /// `None` when no local file was found.
    pub changed_locally: Option<bool>,
    /// The file was located by content hash rather than by its stored path.
    pub found_by_hash: bool,
}

/// What reconciliation decided to do for one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// No entry, or the tracked file is gone: download and track the new file.
    Download,
    /// Changed remotely and locally: set `local` aside as `<stem>.local<ext>`, then download to `local`.
    PreserveAndDownload { local: PathBuf },
    /// Changed remotely only: replace the file at `path` with a fresh download.
    Overwrite { path: PathBuf },
    /// Unchanged, but the file now lives at `path`: record the new path, no download.
    Relocate { path: PathBuf },
    /// Already in sync.
    InSync,
}

/// Where a course sits in the remote listing. Decides its parent folder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Active,
    Info,
    Completed,
}

/// Remote item descriptor as supplied by the listing collaborator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    #[serde(default)]
    pub id: String,
    /// Where the download collaborator fetches the content from.
    #[serde(default)]
    pub url: Option<String>,
    /// Suggested display name; used to name the file after a fresh download.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub downloadable: bool,
}

impl RemoteItem {
    /// Name used in log lines: display name, else id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteSection {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<RemoteItem>,
}

impl RemoteSection {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn has_downloadable(&self) -> bool {
        self.items.iter().any(|i| i.downloadable)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteCourse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub sections: Vec<RemoteSection>,
}

impl RemoteCourse {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Logical identity written into the course folder's marker.
    pub fn folder_id(&self) -> String {
        format!("course-{}", self.id)
    }

    /// Logical identity written into a section folder's marker.
    pub fn section_folder_id(&self, section: &RemoteSection) -> String {
        format!("course-{}/section-{}", self.id, section.id)
    }
}

/// Parent folders per course status. `all()` is the search space for folders and hashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncRoots {
    pub base: PathBuf,
    pub info: PathBuf,
    pub completed: PathBuf,
}

impl SyncRoots {
    /// Roots with the default sub-folder names.
    pub fn new(base: &Path) -> Self {
        Self::with_dirs(base, RootDefaults::INFO_DIR, RootDefaults::COMPLETED_DIR)
    }

    pub fn with_dirs(base: &Path, info_dir: &str, completed_dir: &str) -> Self {
        SyncRoots {
            base: base.to_path_buf(),
            info: base.join(info_dir),
            completed: base.join(completed_dir),
        }
    }

    pub fn for_status(&self, status: CourseStatus) -> &Path {
        match status {
            CourseStatus::Active => &self.base,
            CourseStatus::Info => &self.info,
            CourseStatus::Completed => &self.completed,
        }
    }

    /// Search roots in priority order. A root nested inside an earlier one is dropped:
    /// it is already covered by the earlier walk, so first-match results do not change.
    pub fn all(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(3);
        for r in [&self.base, &self.info, &self.completed] {
            if !roots.iter().any(|seen| r.starts_with(seen)) {
                roots.push(r.clone());
            }
        }
        roots
    }
}

/// Options for a sync pass (CLI, config file, or lib caller).
#[derive(Clone, Debug)]
pub struct SyncOpts {
    /// JSON manifest describing the remote listing.
    pub manifest: Option<PathBuf>,
    /// Directory the mirror downloader copies from. Defaults to the manifest's directory.
    pub mirror: Option<PathBuf>,
    pub info_dir: String,
    pub completed_dir: String,
    /// Course ids skipped entirely.
    pub exclude_courses: Vec<String>,
    pub verbose: bool,
    /// Print one line per action with its path.
    pub list_paths: bool,
    /// Report planned actions; touch nothing.
    pub dry_run: bool,
}

impl Default for SyncOpts {
    fn default() -> Self {
        SyncOpts {
            manifest: None,
            mirror: None,
            info_dir: RootDefaults::INFO_DIR.to_string(),
            completed_dir: RootDefaults::COMPLETED_DIR.to_string(),
            exclude_courses: Vec::new(),
            verbose: false,
            list_paths: false,
            dry_run: false,
        }
    }
}

impl SyncOpts {
    pub fn roots(&self, base: &Path) -> SyncRoots {
        SyncRoots::with_dirs(base, &self.info_dir, &self.completed_dir)
    }
}

/// Outcome of one sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Fresh downloads (new items and re-downloads of missing files).
    pub downloaded: Vec<PathBuf>,
    /// Files replaced after a remote change.
    pub updated: Vec<PathBuf>,
    /// `(set-aside local copy, new download)` pairs.
    pub conflicts: Vec<(PathBuf, PathBuf)>,
    /// Files found at a new location by hash.
    pub relocated: Vec<PathBuf>,
    pub in_sync: usize,
    /// `(item or course label, error)` for everything that failed.
    pub failed: Vec<(String, String)>,
    /// Set when Ctrl+C stopped the pass early.
    pub cancelled: bool,
}

impl SyncReport {
    pub fn changes(&self) -> usize {
        self.downloaded.len() + self.updated.len() + self.conflicts.len() + self.relocated.len()
    }
}

/// One line of a dry run: which item, and what a real pass would do with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedItem {
    pub label: String,
    pub item_id: String,
    pub action: Action,
}
