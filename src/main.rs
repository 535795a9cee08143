//! Campsync CLI: sync a course folder tree; use --dry-run to plan without acting.

use anyhow::Result;
use campsync::engine::arg_parser::Cli;
use campsync::engine::handle_run;
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
