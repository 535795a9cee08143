//! Three-way reconciliation: remote fingerprint vs. stored fingerprint vs. on-disk hash.
//!
//! [`Reconciler::local_status`] looks at the filesystem, [`decide`] maps the status to an
//! [`Action`], and [`Reconciler::reconcile`] carries it out. Every applied action ends with
//! exactly one [`EntryStore::upsert`].

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use super::hashing::{find_by_hash, hash_equals, hash_file};
use super::naming::{conflict_free_name, local_copy_name};
use super::store::EntryStore;
use super::tools::{extension_with_dot, sanitize_file_name};
use crate::error::{IoContext, Result, SyncError};
use crate::pipeline::source::Downloader;
use crate::utils::config::PackagePaths;
use crate::{Action, EntryStatus, RemoteItem};

/// What [`Reconciler::reconcile`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Downloaded(PathBuf),
    Updated(PathBuf),
    Conflict { local_copy: PathBuf, path: PathBuf },
    Relocated(PathBuf),
    InSync,
}

/// Map a status snapshot to the action to take. Priority: missing file, conflict, remote update, relocation.
pub fn decide(status: &EntryStatus) -> Action {
    let Some(path) = status.file_path.clone().filter(|_| status.file_exists) else {
        return Action::Download;
    };
    match (status.changed_on_remote, status.changed_locally) {
        (Some(true), Some(true)) => Action::PreserveAndDownload { local: path },
        (Some(true), _) => Action::Overwrite { path },
        (_, Some(false)) if status.found_by_hash => Action::Relocate { path },
        _ => Action::InSync,
    }
}

/// Reconciles remote items against an [`EntryStore`], searching `roots` for moved files.
pub struct Reconciler<'a> {
    store: &'a mut EntryStore,
    roots: Vec<PathBuf>,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a mut EntryStore, roots: &[PathBuf]) -> Self {
        Reconciler {
            store,
            roots: roots.to_vec(),
        }
    }

    pub fn store(&self) -> &EntryStore {
        &*self.store
    }

    /// Compute the local status of `item` from its entry and the current filesystem. No side effects.
    pub fn local_status(&self, item: &RemoteItem) -> Result<EntryStatus> {
        let Some(entry) = self.store.get(&item.id) else {
            return Ok(EntryStatus::default());
        };
        let mut status = EntryStatus {
            entry_exists: true,
            changed_on_remote: Some(
                item.fingerprint
                    .as_deref()
                    .is_some_and(|remote| entry.fingerprint.as_deref() != Some(remote)),
            ),
            ..EntryStatus::default()
        };

        // Stored path first; a full hash search only when it is stale.
        let (path, found_by_hash) = if entry.path.is_file() {
            (Some(entry.path.clone()), false)
        } else {
            debug!(
                "{} not at {}; searching by hash",
                item.id,
                entry.path.display()
            );
            (find_by_hash(&self.roots, &entry.hash), true)
        };
        let Some(path) = path else {
            return Ok(status);
        };
        status.file_exists = true;
        status.found_by_hash = found_by_hash;

        if found_by_hash {
            // Matched on entry.hash, so unchanged by construction.
            status.changed_locally = Some(false);
            status.file_path = Some(path);
            return Ok(status);
        }

        let actual = hash_file(&path)?;
        if hash_equals(&entry.hash, &actual) {
            status.changed_locally = Some(false);
            status.file_path = Some(path);
            return Ok(status);
        }

        // Edited in place, unless the managed copy moved and the user put a different file here.
        status.changed_locally = Some(true);
        status.file_path = Some(path.clone());
        if let Some(recovered) = find_by_hash(&self.roots, &entry.hash)
            && recovered != path
        {
            debug!(
                "{}: {} diverged; managed copy found at {}",
                item.id,
                path.display(),
                recovered.display()
            );
            status.file_path = Some(recovered);
            status.changed_locally = Some(false);
            status.found_by_hash = true;
        }
        Ok(status)
    }

    /// Status and the action it implies, without acting.
    pub fn plan(&self, item: &RemoteItem) -> Result<(EntryStatus, Action)> {
        let status = self.local_status(item)?;
        let action = decide(&status);
        Ok((status, action))
    }

    /// Reconcile `item`, downloading into `folder` when needed.
    /// The caller filters out items that are not downloadable.
    pub fn reconcile(
        &mut self,
        item: &RemoteItem,
        folder: &Path,
        downloader: &dyn Downloader,
    ) -> Result<Outcome> {
        check_identity(item)?;
        let (_, action) = self.plan(item)?;
        self.apply(item, action, folder, downloader)
    }

    /// Carry out a planned `action` for `item`.
    pub fn apply(
        &mut self,
        item: &RemoteItem,
        action: Action,
        folder: &Path,
        downloader: &dyn Downloader,
    ) -> Result<Outcome> {
        match action {
            Action::InSync => Ok(Outcome::InSync),
            Action::Relocate { path } => {
                let (fingerprint, hash) = match self.store.get(&item.id) {
                    Some(e) => (e.fingerprint.clone(), e.hash.clone()),
                    None => return Ok(Outcome::InSync),
                };
                info!("> File moved, now tracked at {}", path.display());
                self.store
                    .upsert(&item.id, fingerprint.as_deref(), &hash, &path)?;
                Ok(Outcome::Relocated(path))
            }
            Action::Download => {
                info!("> File does not exist, download it…");
                let staged = Staged::fetch(item, folder, downloader)?;
                let target = match item.name.as_deref() {
                    Some(name) => {
                        let nice = sanitize_file_name(name, &extension_with_dot(&staged.file));
                        info!("> Rename file to {nice}");
                        folder.join(nice)
                    }
                    None => folder.join(staged.file_name()),
                };
                let path = staged.place(&conflict_free_name(&target))?;
                self.record(item, &path)?;
                info!("> Done, file saved at {}", path.display());
                Ok(Outcome::Downloaded(path))
            }
            Action::Overwrite { path } => {
                info!("> File changed remotely, update it…");
                let staged = Staged::fetch(item, path.parent().unwrap_or(folder), downloader)?;
                staged.place(&path)?;
                self.record(item, &path)?;
                info!("> Done, file saved at {}", path.display());
                Ok(Outcome::Updated(path))
            }
            Action::PreserveAndDownload { local } => {
                info!("> File changed remotely and locally, keep local copy and download update…");
                // Fetch before touching the local file so a failed download changes nothing.
                let staged = Staged::fetch(item, local.parent().unwrap_or(folder), downloader)?;
                let local_copy = local_copy_name(&local);
                fs::rename(&local, &local_copy).at_path(&local)?;
                info!("> Local file renamed to {}", local_copy.display());
                let path = staged.place(&conflict_free_name(&local))?;
                self.record(item, &path)?;
                info!("> Downloaded new file at {}", path.display());
                Ok(Outcome::Conflict { local_copy, path })
            }
        }
    }

    fn record(&mut self, item: &RemoteItem, path: &Path) -> Result<()> {
        let hash = hash_file(path)?;
        self.store
            .upsert(&item.id, item.fingerprint.as_deref(), &hash, path)
    }
}

/// Items must carry a non-empty id to be tracked.
pub fn check_identity(item: &RemoteItem) -> Result<()> {
    if item.id.trim().is_empty() {
        return Err(SyncError::MissingIdentity {
            what: format!("item {:?} has no id", item.label()),
        });
    }
    Ok(())
}

/// A download sitting in the hidden staging directory of its target folder,
/// so moving it into place is a same-directory-tree rename.
/// Dropping it removes the staging directory.
struct Staged {
    dir: PathBuf,
    file: PathBuf,
}

impl Staged {
    fn fetch(item: &RemoteItem, folder: &Path, downloader: &dyn Downloader) -> Result<Self> {
        let dir = folder.join(PackagePaths::get().staging_dir_name());
        fs::create_dir_all(&dir).at_path(&dir)?;
        let mut staged = Staged {
            dir,
            file: PathBuf::new(),
        };
        staged.file = downloader.download(item, &staged.dir)?;
        if !staged.file.is_file() {
            return Err(SyncError::Download {
                item: item.id.clone(),
                reason: format!("{} is not a regular file", staged.file.display()),
            });
        }
        Ok(staged)
    }

    fn file_name(&self) -> PathBuf {
        self.file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("download"))
    }

    /// Move the download to `target`, replacing any file there.
    fn place(self, target: &Path) -> Result<PathBuf> {
        fs::rename(&self.file, target).at_path(target)?;
        Ok(target.to_path_buf())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}
