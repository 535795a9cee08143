//! Load `.campsync.toml` from the sync root (CLI only). Lib callers pass [`SyncOpts`](crate::SyncOpts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::SyncOpts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct CampsyncToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    info_dir: Option<String>,
    completed_dir: Option<String>,
    exclude_courses: Option<Vec<String>>,
    manifest: Option<String>,
    mirror: Option<String>,
    list: Option<bool>,
    verbose: Option<bool>,
}

/// Load `.campsync.toml` from `dir` if present. Returns None if missing or unparsable (parse errors are logged).
pub fn load_campsync_toml(dir: &Path) -> Option<CampsyncToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_campsync_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_campsync_toml(s: &str) -> Result<CampsyncToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
/// Relative `manifest` / `mirror` paths are resolved against `dir`.
pub fn apply_file_to_opts(file: &CampsyncToml, dir: &Path, opts: &mut SyncOpts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, info_dir => info_dir);
    apply_file_opt!(s, opts, completed_dir => completed_dir);
    apply_file_opt!(s, opts, exclude_courses => exclude_courses);
    apply_file_opt!(s, opts, list => list_paths);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(ref p) = s.manifest {
        opts.manifest = Some(resolve_against(dir, p));
    }
    if let Some(ref p) = s.mirror {
        opts.mirror = Some(resolve_against(dir, p));
    }
}

fn resolve_against(dir: &Path, p: &str) -> PathBuf {
    let path = PathBuf::from(p);
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}
