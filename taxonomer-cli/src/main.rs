use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use taxonomer_core::TaxonomerError;

fn main() {
    let cli = Cli::parse();

    // TAXONOMER_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("TAXONOMER_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

/// Map the first engine error in the chain to a process exit code
fn exit_code(error: &anyhow::Error) -> i32 {
    let engine_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<TaxonomerError>());
    match engine_error {
        Some(TaxonomerError::Configuration(_)) => 2,
        Some(TaxonomerError::Io(_)) => 3,
        Some(TaxonomerError::Serialization(_)) => 4,
        Some(TaxonomerError::Integrity(_)) => 5,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Diff(args) => cli::commands::diff::run(args, &config),
        Commands::Check(args) => cli::commands::check::run(args),
        Commands::Map(args) => cli::commands::map::run(args, &config),
        Commands::Migrate(args) => cli::commands::migrate::run(args),
        Commands::Chain(args) => cli::commands::chain::run(args, &config),
    }
}
