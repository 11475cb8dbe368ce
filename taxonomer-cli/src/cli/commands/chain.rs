use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use taxonomer_core::Config;
use taxonomer_evolution::{DirectoryArchive, VersionChain};

use super::{print_map_summary, write_map};

#[derive(Args)]
pub struct ChainArgs {
    /// First version of the range
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Last version of the range
    #[arg(value_name = "TO")]
    pub to: String,

    /// Archive directory holding one document per version; defaults to
    /// `[archive].directory`
    #[arg(short, long, value_name = "DIR")]
    pub archive: Option<PathBuf>,

    /// Write the composed map here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ChainArgs, config: &Config) -> Result<()> {
    let root = args
        .archive
        .or_else(|| config.archive.directory.as_ref().map(PathBuf::from))
        .ok_or_else(|| {
            taxonomer_core::TaxonomerError::Configuration(
                "no archive directory: pass --archive or set archive.directory".to_string(),
            )
        })?;

    let archive = DirectoryArchive::new(root.clone(), config.archive.extension.clone());
    let chain = VersionChain::new(&archive, config.clone());
    let map = chain
        .migration_map(&args.from, &args.to)
        .with_context(|| {
            format!(
                "Failed to chain {} → {} in {}",
                args.from,
                args.to,
                root.display()
            )
        })?;

    write_map(&map, args.output.as_deref())?;
    print_map_summary(&map);
    Ok(())
}
