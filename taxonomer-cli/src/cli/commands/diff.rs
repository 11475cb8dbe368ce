use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use taxonomer_core::Config;
use taxonomer_evolution::{MigrationMap, Status, TransitionAnalyzer};
use taxonomer_utils::output;
use taxonomer_utils::{render, DiffSummary, OutputFormat, Reportable};

use super::{load_snapshot, print_map_summary, write_map, write_output};

#[derive(Args)]
pub struct DiffArgs {
    /// Snapshot document of the older release
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// Snapshot document of the newer release
    #[arg(value_name = "NEW")]
    pub new: PathBuf,

    /// Output format (text, json, csv); defaults to `[report].format`
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the migration map for this transition
    #[arg(long = "map-out", value_name = "FILE")]
    pub map_out: Option<PathBuf>,
}

pub fn run(args: DiffArgs, config: &Config) -> Result<()> {
    let format = match args.format {
        Some(format) => format,
        None => config.report.format.parse()?,
    };

    let old = load_snapshot(&args.old)?;
    let new = load_snapshot(&args.new)?;
    let report = TransitionAnalyzer::new(config.clone()).diff(&old, &new);

    // JSON carries the diff report itself so downstream consumers get the
    // stable field names
    let content = match format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Text | OutputFormat::Csv => {
            render(&DiffSummary::new(&report, &config.report).to_report(), format)?
        }
    };
    write_output(&content, args.output.as_deref())?;

    let summary = DiffSummary::new(&report, &config.report);
    let message = format!(
        "{} → {}: {} changes, {} unchanged, quality {}",
        report.old.version,
        report.new.version,
        output::format_number(report.counts.total),
        output::format_number(report.unchanged.len()),
        output::quality_line(report.quality_score, summary.band()),
    );
    if report.counts.of_status(Status::Error) > 0 {
        output::warning(&message);
    } else {
        output::success(&message);
    }

    if let Some(path) = &args.map_out {
        let map = MigrationMap::build(&report);
        write_map(&map, Some(path))?;
        print_map_summary(&map);
    }

    Ok(())
}
