use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use taxonomer_core::{Rank, TaxonIdentity, TaxonomerError};
use taxonomer_evolution::{ExternalRecord, MigrationMap, MigrationOutcome};
use taxonomer_utils::output;

use super::write_output;

#[derive(Args)]
pub struct MigrateArgs {
    /// Migration map produced by `map`, `diff --map-out` or `chain`
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Rank of the identity to migrate
    #[arg(long, requires = "name", conflicts_with = "records")]
    pub rank: Option<Rank>,

    /// Name of the identity to migrate
    #[arg(long, requires = "rank")]
    pub name: Option<String>,

    /// Species the record belongs to, used to resolve splits
    #[arg(long)]
    pub species: Option<String>,

    /// JSON array of records to migrate in one go
    #[arg(long, value_name = "FILE", required_unless_present = "rank")]
    pub records: Option<PathBuf>,

    /// Version the records are tagged with
    #[arg(long, value_name = "VERSION")]
    pub from: String,

    /// Version to migrate to
    #[arg(long, value_name = "VERSION")]
    pub to: String,

    /// Write outcomes here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn read_records(path: &Path) -> Result<Vec<ExternalRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(TaxonomerError::from)
        .with_context(|| format!("Failed to read records {}", path.display()))?;
    let records = serde_json::from_str(&content)
        .map_err(TaxonomerError::from)
        .with_context(|| format!("Failed to parse records {}", path.display()))?;
    Ok(records)
}

pub fn run(args: MigrateArgs) -> Result<()> {
    let map = MigrationMap::read_from_file(&args.map)
        .with_context(|| format!("Failed to load migration map {}", args.map.display()))?;

    let content = match (&args.records, args.rank, &args.name) {
        (Some(path), _, _) => {
            let records = read_records(path)?;
            let outcomes = records
                .iter()
                .map(|record| map.apply(record, &args.from, &args.to))
                .collect::<Result<Vec<MigrationOutcome>, _>>()?;

            let updated = outcomes.iter().filter(|o| o.is_updated()).count();
            let ambiguous = outcomes.iter().filter(|o| o.is_ambiguous()).count();
            output::info(&format!(
                "Migrated {} records: {} updated, {} ambiguous, {} unmapped",
                outcomes.len(),
                updated,
                ambiguous,
                outcomes.len() - updated - ambiguous
            ));
            serde_json::to_string_pretty(&outcomes)?
        }
        (None, Some(rank), Some(name)) => {
            let mut record = ExternalRecord::new(TaxonIdentity::new(rank, name.clone()));
            if let Some(species) = &args.species {
                record = record.with_species(species.clone());
            }
            let outcome = map.apply(&record, &args.from, &args.to)?;
            if !outcome.is_updated() {
                output::warning(&format!("{} was not migrated cleanly", record.identity));
            }
            serde_json::to_string_pretty(&outcome)?
        }
        _ => {
            return Err(TaxonomerError::InvalidInput(
                "pass either --records or both --rank and --name".to_string(),
            )
            .into())
        }
    };

    write_output(&content, args.output.as_deref())
}
