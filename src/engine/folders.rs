//! Folder identity via hidden marker files.
//!
//! Every managed folder holds a marker whose first line is a logical id such as
//! `course-42` or `course-42/section-7`. Lookups go by that id, so a folder keeps
//! its identity when the user renames or moves it inside a root.

use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::naming::conflict_free_name;
use super::tools::folder_name;
use crate::error::{IoContext, Result};
use crate::pipeline::walk::marker_files;
use crate::utils::config::PackagePaths;

/// Read the id from a marker file: first line, surrounding whitespace trimmed.
pub fn read_marker(marker: &Path) -> Option<String> {
    let content = fs::read_to_string(marker).ok()?;
    Some(content.lines().next().unwrap_or("").trim().to_string())
}

/// First folder under `roots` (in order, sorted depth-first) whose marker carries `id`.
pub fn find_folder(id: &str, roots: &[PathBuf]) -> Option<PathBuf> {
    roots.iter().find_map(|root| {
        marker_files(root).find_map(|marker| {
            (read_marker(&marker).as_deref() == Some(id))
                .then(|| marker.parent().map(Path::to_path_buf))
                .flatten()
        })
    })
}

/// Walk all roots once and map every marker id to its folder. The first folder seen for an id wins.
/// Roots are scanned in parallel; merging follows root order so the result matches [`find_folder`].
pub fn index_folders(roots: &[PathBuf]) -> HashMap<String, PathBuf> {
    let per_root: Vec<Vec<(String, PathBuf)>> = roots
        .par_iter()
        .map(|root| {
            marker_files(root)
                .filter_map(|marker| {
                    let id = read_marker(&marker)?;
                    let folder = marker.parent()?.to_path_buf();
                    Some((id, folder))
                })
                .collect()
        })
        .collect();

    let mut index: HashMap<String, PathBuf> = HashMap::new();
    for (id, folder) in per_root.into_iter().flatten() {
        if let Some(first) = index.get(&id) {
            warn!(
                "Folder id {id} is claimed by {} and {}; using the first",
                first.display(),
                folder.display()
            );
            continue;
        }
        index.insert(id, folder);
    }
    index
}

/// Finds and creates managed folders. Optionally caches a marker index for the duration of one pass.
pub struct FolderResolver {
    roots: Vec<PathBuf>,
    index: Option<HashMap<String, PathBuf>>,
}

impl FolderResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        FolderResolver { roots, index: None }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Build the per-pass marker index. Call at the start of every pass.
    pub fn rebuild_index(&mut self) {
        let index = index_folders(&self.roots);
        debug!("Indexed {} managed folder(s)", index.len());
        self.index = Some(index);
    }

    pub fn clear_index(&mut self) {
        self.index = None;
    }

    /// Folder carrying `id`. While the pass index is built, a miss there is final;
    /// only a hit whose marker no longer matches falls back to walking the roots.
    pub fn find_folder(&self, id: &str) -> Option<PathBuf> {
        let Some(index) = self.index.as_ref() else {
            return find_folder(id, &self.roots);
        };
        let folder = index.get(id)?;
        if marker_matches(folder, id) {
            return Some(folder.clone());
        }
        debug!("Indexed folder for {id} is stale; walking roots");
        find_folder(id, &self.roots)
    }

    /// Return the folder carrying `id`; create `parent/<display_name>` (conflict-free) with a marker if none exists.
    pub fn find_or_create_folder(
        &mut self,
        id: &str,
        display_name: &str,
        parent: &Path,
    ) -> Result<PathBuf> {
        if let Some(existing) = self.find_folder(id) {
            return Ok(existing);
        }
        fs::create_dir_all(parent).at_path(parent)?;
        let folder = conflict_free_name(&parent.join(folder_name(display_name)));
        fs::create_dir(&folder).at_path(&folder)?;
        let marker = folder.join(PackagePaths::get().marker_filename());
        fs::write(&marker, format!("{id}\n")).at_path(&marker)?;
        debug!("Created folder {} for {}", folder.display(), id);
        if let Some(index) = self.index.as_mut() {
            index.insert(id.to_string(), folder.clone());
        }
        Ok(folder)
    }
}

fn marker_matches(folder: &Path, id: &str) -> bool {
    read_marker(&folder.join(PackagePaths::get().marker_filename())).as_deref() == Some(id)
}
