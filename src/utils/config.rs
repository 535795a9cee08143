//! Application configuration constants.
//! File names, thresholds and defaults in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    state_filename: String,
    marker_filename: String,
    config_filename: String,
    staging_dir_name: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                state_filename: format!(".{pkg}.db"),
                marker_filename: format!(".{pkg}-folder"),
                config_filename: format!(".{pkg}.toml"),
                staging_dir_name: format!(".{pkg}-partial"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// State file kept at the sync root (`.campsync.db`).
    pub fn state_filename(&self) -> &str {
        &self.state_filename
    }

    /// Hidden file carrying a managed folder's logical id.
    pub fn marker_filename(&self) -> &str {
        &self.marker_filename
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Hidden directory inside a target folder where downloads land before being moved into place.
    pub fn staging_dir_name(&self) -> &str {
        &self.staging_dir_name
    }
}

// ---- State file ----

pub struct StateConsts;

impl StateConsts {
    /// The only state document version this build reads and writes.
    pub const VERSION: u32 = 1;
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for streaming files below the mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
    /// Candidates pulled from the walk and hashed in parallel per step of a hash search.
    pub const HASH_SEARCH_BATCH: usize = 256;
}

// ---- Roots ----

/// Default sub-folder names for non-active courses, relative to the sync root.
pub struct RootDefaults;

impl RootDefaults {
    pub const INFO_DIR: &'static str = "Infos & Organisatorisches";
    pub const COMPLETED_DIR: &'static str = "Abgeschlossene Module";
}

// ---- Naming ----

/// Infix inserted before the extension when a locally edited file is set aside.
pub const LOCAL_COPY_INFIX: &str = ".local";

/// Environment variable naming the default sync root.
pub const ROOT_ENV_VAR: &str = "CAMPSYNC_PATH";
