//! Sync pass over a root directory

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::store::EntryStore;
use crate::pipeline::{Downloader, ManifestSource, MirrorDownloader, Orchestrator, RemoteSource};
use crate::utils::Colors;
use crate::{SyncOpts, SyncReport};

/// Run one pass with caller-supplied collaborators. Opens (or creates) the store under `root` first,
/// so the state file exists before any item is reconciled.
pub fn sync_with(
    root: &Path,
    opts: &SyncOpts,
    source: &dyn RemoteSource,
    downloader: &dyn Downloader,
    cancel: Option<Arc<AtomicBool>>,
) -> crate::Result<SyncReport> {
    let mut store = EntryStore::open(root)?;
    let courses = source.courses()?;
    let mut orchestrator = Orchestrator::new(&mut store, opts.roots(root), downloader)
        .exclude_courses(opts.exclude_courses.clone());
    if let Some(flag) = cancel {
        orchestrator = orchestrator.cancel_flag(flag);
    }
    Ok(orchestrator.run(&courses))
}

/// Manifest path from opts, and the mirror directory (defaults to the manifest's directory).
pub(crate) fn manifest_and_mirror(opts: &SyncOpts) -> Result<(PathBuf, PathBuf)> {
    let manifest = opts
        .manifest
        .clone()
        .context("no manifest given (use --manifest or `manifest` in the config file)")?;
    let mirror = opts.mirror.clone().unwrap_or_else(|| {
        manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    Ok((manifest, mirror))
}

/// CLI sync: manifest listing, mirror downloads, Ctrl+C stops after the current item.
pub fn sync_dir(root: &Path, opts: &SyncOpts) -> Result<SyncReport> {
    let root = root
        .canonicalize()
        .with_context(|| format!("sync root {} does not exist", root.display()))?;
    let (manifest, mirror) = manifest_and_mirror(opts)?;
    let source = ManifestSource::new(&manifest);
    let downloader = MirrorDownloader::new(&mirror);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let report = sync_with(
        &root,
        opts,
        &source,
        &downloader,
        Some(Arc::clone(&cancel_requested)),
    )
    .with_context(|| format!("sync {}", root.display()))?;

    print_report(&report, opts.list_paths);
    if report.cancelled {
        return Err(anyhow::anyhow!(
            "Sync cancelled by user; finished items were saved"
        ));
    }
    Ok(report)
}

/// Print the pass summary, and with `list` one line per changed path.
pub fn print_report(report: &SyncReport, list: bool) {
    if list {
        for p in &report.downloaded {
            println!("+ {}", p.display());
        }
        for p in &report.updated {
            println!("~ {}", p.display());
        }
        for (local, p) in &report.conflicts {
            println!("! {} (local copy: {})", p.display(), local.display());
        }
        for p in &report.relocated {
            println!("> {}", p.display());
        }
    }

    info!(
        "{} | {} | {} | Relocated: {} | In sync: {} | {}",
        Colors::colorize(
            Colors::DOWNLOADED,
            &format!("Downloaded: {}", report.downloaded.len())
        ),
        Colors::colorize(Colors::UPDATED, &format!("Updated: {}", report.updated.len())),
        Colors::colorize(
            Colors::CONFLICT,
            &format!("Conflicts: {}", report.conflicts.len())
        ),
        report.relocated.len(),
        report.in_sync,
        Colors::colorize(Colors::FAILED, &format!("Failed: {}", report.failed.len())),
    );
    for (label, err) in &report.failed {
        warn!("failed: {label}: {err}");
    }
}
