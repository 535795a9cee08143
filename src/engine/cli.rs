//! CLI command handler: sync by default; --dry-run plans without acting.

use anyhow::Result;
use log::{debug, warn};

use crate::SyncOpts;
use crate::check::check_dir;
use crate::engine::arg_parser::Cli;
use crate::sync::sync_dir;
use crate::utils::{apply_file_to_opts, load_campsync_toml, setup_logging};

/// Build opts: defaults, then `.campsync.toml` in the root, then CLI flags.
pub fn setup_opts(cli: &Cli) -> SyncOpts {
    let root = cli.root();
    let mut opts = SyncOpts::default();
    if let Some(file) = load_campsync_toml(&root) {
        apply_file_to_opts(&file, &root, &mut opts);
    }
    if let Some(ref m) = cli.manifest {
        opts.manifest = Some(m.clone());
    }
    if let Some(ref m) = cli.mirror {
        opts.mirror = Some(m.clone());
    }
    if let Some(v) = cli.list {
        opts.list_paths = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if !cli.exclude_courses.is_empty() {
        opts.exclude_courses = cli.exclude_courses.clone();
    }
    opts.dry_run = cli.dry_run;
    opts
}

/// Run a sync pass (default) or a dry run.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let _ = dotenvy::dotenv();
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    let root = cli.root();
    debug!("State file: {}", cli.state_path().display());
    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NOTHING WILL BE DOWNLOADED OR RENAMED.");
        check_dir(&root, &opts)?;
    } else {
        debug!("Syncing {}...", root.display());
        sync_dir(&root, &opts)?;
    }
    Ok(())
}
