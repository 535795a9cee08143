//! Sync pipeline: remote listing and download seams, tree walks, and the per-pass orchestrator.

pub mod orchestrator;
pub mod source;
pub mod walk;

pub use orchestrator::Orchestrator;
pub use source::{Downloader, ManifestSource, MirrorDownloader, RemoteSource};
pub use walk::{candidate_files, marker_files};
