pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use taxonomer_core::Config;

#[derive(Parser)]
#[command(
    name = "taxonomer",
    version,
    about = "Explain what changed between two releases of a taxonomy",
    long_about = "Taxonomer compares two released snapshots of a virus classification, labels \
                  every difference as a rename, a structural reorganisation or a real \
                  reclassification, and builds migration maps that carry external datasets \
                  from one release to the next."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML); defaults apply when omitted
    #[arg(long, value_name = "FILE", global = true, env = "TAXONOMER_CONFIG")]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every change between two snapshot documents
    Diff(commands::diff::DiffArgs),

    /// Load and validate a single snapshot document
    Check(commands::check::CheckArgs),

    /// Build the migration map between two snapshot documents
    Map(commands::map::MapArgs),

    /// Apply a migration map to external records
    Migrate(commands::migrate::MigrateArgs),

    /// Compose a migration map across every archived version in a range
    Chain(commands::chain::ChainArgs),
}

/// Load the configuration file, or fall back to defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    taxonomer_core::load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
