//! Course → section → item loop. One failing item or course is logged and counted; the pass goes on.

use log::{debug, error, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::folders::FolderResolver;
use crate::engine::reconcile::{Outcome, Reconciler, check_identity};
use crate::engine::store::EntryStore;
use crate::error::Result;
use crate::pipeline::source::Downloader;
use crate::{Action, RemoteCourse, RemoteItem, RemoteSection, SyncReport, SyncRoots};

impl SyncReport {
    /// Count one reconciled item.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Downloaded(p) => self.downloaded.push(p),
            Outcome::Updated(p) => self.updated.push(p),
            Outcome::Conflict { local_copy, path } => self.conflicts.push((local_copy, path)),
            Outcome::Relocated(p) => self.relocated.push(p),
            Outcome::InSync => self.in_sync += 1,
        }
    }
}

/// Drives one sync pass over a remote listing. Items are handled strictly one after another.
pub struct Orchestrator<'a> {
    reconciler: Reconciler<'a>,
    folders: FolderResolver,
    roots: SyncRoots,
    downloader: &'a dyn Downloader,
    exclude_courses: Vec<String>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a mut EntryStore, roots: SyncRoots, downloader: &'a dyn Downloader) -> Self {
        let search_roots = roots.all();
        Orchestrator {
            reconciler: Reconciler::new(store, &search_roots),
            folders: FolderResolver::new(search_roots),
            roots,
            downloader,
            exclude_courses: Vec::new(),
            cancel: None,
        }
    }

    pub fn exclude_courses(mut self, ids: Vec<String>) -> Self {
        self.exclude_courses = ids;
        self
    }

    /// When set and raised, the pass stops before the next item.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Run one pass over `courses`. Upserts already applied stay on disk even if later items fail.
    pub fn run(&mut self, courses: &[RemoteCourse]) -> SyncReport {
        let mut report = SyncReport::default();
        self.folders.rebuild_index();
        for course in courses {
            if self.cancelled() {
                report.cancelled = true;
                break;
            }
            if self.exclude_courses.iter().any(|id| id == &course.id) {
                debug!("Skipping excluded course {}", course.label());
                continue;
            }
            if let Err(e) = self.sync_course(course, &mut report) {
                error!("Unable to sync course {}: {}", course.label(), e);
                report
                    .failed
                    .push((course.label().to_string(), e.to_string()));
            }
        }
        if self.cancelled() {
            report.cancelled = true;
        }
        self.folders.clear_index();
        report
    }

    fn sync_course(&mut self, course: &RemoteCourse, report: &mut SyncReport) -> Result<()> {
        let parent = self.roots.for_status(course.status).to_path_buf();
        let folder =
            self.folders
                .find_or_create_folder(&course.folder_id(), course.label(), &parent)?;
        debug!("{} -> {}", course.label(), folder.display());

        for section in course.sections.iter().filter(|s| s.has_downloadable()) {
            if self.cancelled() {
                return Ok(());
            }
            let section_folder = match self.folders.find_or_create_folder(
                &course.section_folder_id(section),
                section.label(),
                &folder,
            ) {
                Ok(f) => f,
                Err(e) => {
                    let label = format!("{} / {}", course.label(), section.label());
                    error!("Unable to sync section {label}: {e}");
                    report.failed.push((label, e.to_string()));
                    continue;
                }
            };
            self.sync_section(course, section, &section_folder, report);
        }
        Ok(())
    }

    fn sync_section(
        &mut self,
        course: &RemoteCourse,
        section: &RemoteSection,
        folder: &Path,
        report: &mut SyncReport,
    ) {
        for item in section.items.iter().filter(|i| i.downloadable) {
            if self.cancelled() {
                return;
            }
            let label = format!(
                "{} / {} / {} ({})",
                course.label(),
                section.label(),
                item.label(),
                item.id
            );
            match self.sync_item(item, folder, &label) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    error!("{label}: {e}");
                    report.failed.push((label, e.to_string()));
                }
            }
        }
    }

    fn sync_item(&mut self, item: &RemoteItem, folder: &Path, label: &str) -> Result<Outcome> {
        check_identity(item)?;
        let (_, action) = self.reconciler.plan(item)?;
        if action == Action::InSync {
            debug!("{label}: in sync");
        } else {
            info!("{label}");
        }
        self.reconciler
            .apply(item, action, folder, self.downloader)
    }
}
