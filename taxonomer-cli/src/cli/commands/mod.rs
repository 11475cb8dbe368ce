pub mod chain;
pub mod check;
pub mod diff;
pub mod map;
pub mod migrate;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use taxonomer_evolution::{MigrationMap, Snapshot};

/// Load a snapshot document, naming the file on failure
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    Snapshot::load(path).with_context(|| format!("Failed to load snapshot {}", path.display()))
}

/// Write to the given file, or to stdout when there is none
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(taxonomer_core::TaxonomerError::from)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Persist a migration map as JSON
pub fn write_map(map: &MigrationMap, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => map
            .write_to_file(path)
            .with_context(|| format!("Failed to write migration map {}", path.display())),
        None => write_output(&serde_json::to_string_pretty(map)?, None),
    }
}

/// One line summary of a map on stderr
pub fn print_map_summary(map: &MigrationMap) {
    let cardinalities = map
        .cardinality_counts()
        .into_iter()
        .map(|(cardinality, count)| format!("{} {}", count, cardinality))
        .collect::<Vec<_>>()
        .join(", ");
    taxonomer_utils::output::info(&format!(
        "Migration map {} → {}: {} entries ({})",
        map.from_version,
        map.to_version,
        taxonomer_utils::output::format_number(map.len()),
        cardinalities
    ));
}
