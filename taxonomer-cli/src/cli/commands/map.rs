use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use taxonomer_core::Config;
use taxonomer_evolution::{MigrationMap, TransitionAnalyzer};

use super::{load_snapshot, print_map_summary, write_map};

#[derive(Args)]
pub struct MapArgs {
    /// Snapshot document of the older release
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// Snapshot document of the newer release
    #[arg(value_name = "NEW")]
    pub new: PathBuf,

    /// Write the map here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: MapArgs, config: &Config) -> Result<()> {
    let old = load_snapshot(&args.old)?;
    let new = load_snapshot(&args.new)?;
    let report = TransitionAnalyzer::new(config.clone()).diff(&old, &new);
    let map = MigrationMap::build(&report);

    write_map(&map, args.output.as_deref())?;
    print_map_summary(&map);
    Ok(())
}
