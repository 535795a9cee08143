//! Collaborator seams: where the remote listing comes from and how content is fetched.
//!
//! [`ManifestSource`] and [`MirrorDownloader`] serve a listing and content from the local
//! filesystem. Network-backed implementations plug in through the same traits.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result, SyncError};
use crate::{RemoteCourse, RemoteItem};

/// Supplies the remote listing: courses with their sections and items.
pub trait RemoteSource {
    fn courses(&self) -> Result<Vec<RemoteCourse>>;
}

/// Fetches one item's content into `destination` and returns the path of the new regular file.
/// Transport or auth failures surface as [`SyncError::Download`].
pub trait Downloader {
    fn download(&self, item: &RemoteItem, destination: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    courses: Vec<RemoteCourse>,
}

/// Remote listing read from a JSON manifest:
/// `{"courses": [{"id", "name", "status", "sections": [{"id", "name", "items": [...]}]}]}`.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: &Path) -> Self {
        ManifestSource {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RemoteSource for ManifestSource {
    fn courses(&self) -> Result<Vec<RemoteCourse>> {
        let file = File::open(&self.path).at_path(&self.path)?;
        let manifest: Manifest =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| SyncError::Config {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(manifest.courses)
    }
}

/// Copies item content from a mirror directory. `item.url` is a path relative to the mirror
/// (an optional `file://` prefix is stripped); the copy keeps the source's file name.
#[derive(Debug, Clone)]
pub struct MirrorDownloader {
    base: PathBuf,
}

impl MirrorDownloader {
    pub fn new(base: &Path) -> Self {
        MirrorDownloader {
            base: base.to_path_buf(),
        }
    }

    fn source_path(&self, url: &str) -> PathBuf {
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let p = Path::new(rel);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base.join(p)
        }
    }
}

impl Downloader for MirrorDownloader {
    fn download(&self, item: &RemoteItem, destination: &Path) -> Result<PathBuf> {
        let url = item.url.as_deref().ok_or_else(|| SyncError::MissingIdentity {
            what: format!("item {} has no url", item.id),
        })?;
        let source = self.source_path(url);
        let download_err = |reason: String| SyncError::Download {
            item: item.id.clone(),
            reason,
        };
        if !source.is_file() {
            return Err(download_err(format!("{} not found", source.display())));
        }
        let name = source
            .file_name()
            .ok_or_else(|| download_err(format!("{} has no file name", source.display())))?;
        let target = destination.join(name);

        let mut reader = BufReader::new(File::open(&source).map_err(|e| download_err(e.to_string()))?);
        let mut writer = BufWriter::new(File::create(&target).at_path(&target)?);
        std::io::copy(&mut reader, &mut writer).map_err(|e| download_err(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| download_err(e.to_string()))?
            .sync_all()
            .at_path(&target)?;
        Ok(target)
    }
}
