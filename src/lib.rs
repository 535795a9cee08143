//! Campsync: keeps a local course folder tree in sync with a remote listing.
//!
//! Per remote item the [`EntryStore`](engine::EntryStore) remembers the remote fingerprint, the
//! local file's content hash and its path. Each pass compares the three and downloads, updates,
//! relocates, or sets a locally edited copy aside before fetching the new version.

pub mod check;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod sync;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use check::plan_with;
pub use error::{Result, SyncError};
pub use sync::sync_with;
