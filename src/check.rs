//! Dry run: what a sync pass would do, without downloading, renaming, or writing state.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::engine::folders::FolderResolver;
use crate::engine::reconcile::{Reconciler, check_identity};
use crate::engine::store::EntryStore;
use crate::pipeline::{ManifestSource, RemoteSource};
use crate::sync::manifest_and_mirror;
use crate::utils::Colors;
use crate::{Action, PlannedItem, RemoteCourse, SyncOpts};

/// Plan every downloadable item in `courses` against the store under `root`.
/// Items that cannot be planned (missing id, unreadable file) are logged and left out.
pub fn plan_with(
    root: &Path,
    opts: &SyncOpts,
    courses: &[RemoteCourse],
) -> crate::Result<Vec<PlannedItem>> {
    let mut store = EntryStore::open_readonly(root)?;
    let roots = opts.roots(root).all();
    let mut folders = FolderResolver::new(roots.clone());
    folders.rebuild_index();
    let reconciler = Reconciler::new(&mut store, &roots);

    let mut planned = Vec::new();
    for course in courses {
        if opts.exclude_courses.iter().any(|id| id == &course.id) {
            continue;
        }
        if folders.find_folder(&course.folder_id()).is_none() {
            debug!("Would create folder for course {}", course.label());
        }
        for section in course.sections.iter().filter(|s| s.has_downloadable()) {
            for item in section.items.iter().filter(|i| i.downloadable) {
                let label = format!(
                    "{} / {} / {}",
                    course.label(),
                    section.label(),
                    item.label()
                );
                let action = check_identity(item).and_then(|_| reconciler.plan(item));
                match action {
                    Ok((_, action)) => planned.push(PlannedItem {
                        label,
                        item_id: item.id.clone(),
                        action,
                    }),
                    Err(e) => log::warn!("{label}: {e}"),
                }
            }
        }
    }
    Ok(planned)
}

/// CLI dry run over the manifest listing.
pub fn check_dir(root: &Path, opts: &SyncOpts) -> Result<Vec<PlannedItem>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("sync root {} does not exist", root.display()))?;
    let (manifest, _) = manifest_and_mirror(opts)?;
    let courses = ManifestSource::new(&manifest).courses()?;
    let planned = plan_with(&root, opts, &courses)?;
    print_plan(&planned, opts.list_paths);
    Ok(planned)
}

/// Print plan summary
fn print_plan(planned: &[PlannedItem], list: bool) {
    let mut download = 0;
    let mut update = 0;
    let mut conflict = 0;
    let mut relocate = 0;
    for p in planned {
        let line = match &p.action {
            Action::Download => {
                download += 1;
                format!("+ {} (download)", p.label)
            }
            Action::Overwrite { path } => {
                update += 1;
                format!("~ {} ({})", p.label, path.display())
            }
            Action::PreserveAndDownload { local } => {
                conflict += 1;
                format!("! {} ({} kept as local copy)", p.label, local.display())
            }
            Action::Relocate { path } => {
                relocate += 1;
                format!("> {} (moved to {})", p.label, path.display())
            }
            Action::InSync => continue,
        };
        if list {
            println!("{line}");
        }
    }

    if download + update + conflict + relocate == 0 {
        info!("Everything is in sync.");
        return;
    }

    info!(
        "{} | {} | {} | Relocate: {}",
        Colors::colorize(Colors::DOWNLOADED, &format!("Download: {download}")),
        Colors::colorize(Colors::UPDATED, &format!("Update: {update}")),
        Colors::colorize(Colors::CONFLICT, &format!("Conflict: {conflict}")),
        relocate
    );
}
