use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::{PackagePaths, ROOT_ENV_VAR};

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Keep a local course folder tree in sync with a remote listing.
#[derive(Clone, Parser)]
#[command(name = "campsync")]
#[command(about = "Sync a course folder tree; use --dry-run to see planned actions without touching anything.")]
pub struct Cli {
    /// Sync root. Default: $CAMPSYNC_PATH, else the current directory.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// JSON manifest describing the remote courses, sections and items.
    #[arg(long, short = 'm')]
    pub manifest: Option<PathBuf>,

    /// Directory item urls are resolved against. Default: the manifest's directory.
    #[arg(long)]
    pub mirror: Option<PathBuf>,

    /// Report what would be downloaded, updated or relocated; change nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// List each changed path.
    #[arg(long, short = 'l', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub list: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Course ids to skip. Can specify multiple: -x 1844 2567
    #[arg(long, short = 'x', num_args = 1..)]
    pub exclude_courses: Vec<String>,
}

impl Cli {
    /// Sync root: DIR, else `$CAMPSYNC_PATH`, else `.`.
    pub fn root(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            std::env::var_os(ROOT_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DefaultArgs::DIR))
        })
    }

    /// Path of the state file inside the sync root.
    pub fn state_path(&self) -> PathBuf {
        self.root().join(PackagePaths::get().state_filename())
    }
}
