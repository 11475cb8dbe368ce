use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use std::path::PathBuf;
use taxonomer_core::Rank;
use taxonomer_utils::output::{self, create_standard_table, format_number, header_cell};

use super::load_snapshot;

#[derive(Args)]
pub struct CheckArgs {
    /// Snapshot document to validate
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;

    let mut table = create_standard_table();
    table.set_header(vec![header_cell("Rank"), header_cell("Taxa"), header_cell("Mandatory")]);
    for rank in Rank::non_leaf() {
        let taxa = snapshot.taxa_at(rank).len();
        let mandatory = snapshot.schema().mandatory_ranks.contains(&rank);
        if taxa == 0 && !mandatory {
            continue;
        }
        table.add_row(vec![
            Cell::new(rank),
            Cell::new(format_number(taxa)),
            Cell::new(if mandatory { "yes" } else { "" }),
        ]);
    }
    println!("{}", table);

    output::success(&format!(
        "Snapshot {} is valid: {} species",
        snapshot.version(),
        format_number(snapshot.len())
    ));
    Ok(())
}
