//! Error types for the tracking store and reconciliation engine.

use std::path::PathBuf;

/// Result type for campsync library operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised by the store, the resolvers and the reconciliation engine.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// File read/write/stream failure. Aborts the item being processed, not the run.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file is unreadable or carries an unknown version. Fatal at startup.
    #[error("Corrupt state file {}: {reason}", .path.display())]
    CorruptState { path: PathBuf, reason: String },

    /// Remote item lacks an id or url.
    #[error("Missing identity: {what}")]
    MissingIdentity { what: String },

    /// Opaque failure from the download collaborator.
    #[error("Download of {item} failed: {reason}")]
    Download { item: String, reason: String },

    /// The sync root does not exist.
    #[error("Working directory {} does not exist", .0.display())]
    RootMissing(PathBuf),

    /// Config file or manifest could not be parsed.
    #[error("Invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl SyncError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach a path to `std::io::Result` values.
pub(crate) trait IoContext<T> {
    fn at_path(self, path: &std::path::Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at_path(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| SyncError::io(path, e))
    }
}
