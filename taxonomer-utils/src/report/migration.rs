//! `Reportable` view of a migration map

use crate::report::core::{Cell, CellStyle, Metric, MetricSeverity, Report, Reportable, Section, Table};
use taxonomer_evolution::{Cardinality, MigrationEntry, MigrationMap};

/// Entries that do more than map a taxon onto itself
fn is_translation(entry: &MigrationEntry) -> bool {
    match entry.targets.as_slice() {
        [only] => only.identity != entry.source,
        _ => true,
    }
}

fn entry_row(entry: &MigrationEntry) -> Vec<Cell> {
    let targets = entry
        .targets
        .iter()
        .map(|t| t.identity.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let cardinality_style = match entry.cardinality {
        Cardinality::OneToOne => CellStyle::Normal,
        Cardinality::ManyToOne => CellStyle::Highlight,
        Cardinality::OneToMany | Cardinality::ManyToMany => CellStyle::Warning,
    };

    vec![
        Cell::new(&entry.source),
        Cell::new(targets),
        Cell::new(entry.cardinality).with_style(cardinality_style),
        Cell::new(if entry.is_ambiguous() { "yes" } else { "no" }),
    ]
}

impl Reportable for MigrationMap {
    fn to_report(&self) -> Report {
        let translations: Vec<&MigrationEntry> =
            self.entries.iter().filter(|e| is_translation(e)).collect();
        let ambiguous = self.entries.iter().filter(|e| e.is_ambiguous()).count();

        let mut table = Table::new(["Source", "Targets", "Cardinality", "Ambiguous"]);
        for entry in &translations {
            table.add_row(entry_row(entry));
        }

        Report::builder(
            format!("Migration map {} → {}", self.from_version, self.to_version),
            "map",
        )
        .metadata("from", self.from_version.clone())
        .metadata("to", self.to_version.clone())
        .section(Section::summary(
            "Summary",
            vec![
                Metric::new("Entries", self.len()),
                Metric::new("Translations", translations.len()),
                Metric::new("Ambiguous", ambiguous).with_severity(if ambiguous > 0 {
                    MetricSeverity::Warning
                } else {
                    MetricSeverity::Success
                }),
            ],
        ))
        .section(Section::key_value(
            "Cardinality",
            self.cardinality_counts()
                .into_iter()
                .map(|(cardinality, count)| (cardinality.to_string(), count.to_string()))
                .collect(),
        ))
        .section(Section::table("Translations", table))
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::core::SectionContent;
    use taxonomer_core::Config;
    use taxonomer_evolution::TransitionAnalyzer;
    use taxonomer_test::scenario_family_split;

    #[test]
    fn test_split_map_report() {
        let (old, new) = scenario_family_split(6);
        let diff = TransitionAnalyzer::new(Config::default()).diff(&old, &new);
        let map = MigrationMap::build(&diff);
        let report = map.to_report();

        let SectionContent::Table(table) = &report.section("Translations").unwrap().content else {
            panic!("translations should be a table");
        };
        let family = table
            .rows
            .iter()
            .find(|row| row[0].value == "family:Largeviridae")
            .expect("split family listed");
        assert_eq!(family[1].value, "family:Smallaviridae, family:Smallbviridae");
        assert_eq!(family[2].value, "1:N");
        assert_eq!(family[3].value, "yes");

        // Species keep their names, so only lineage edges translate
        assert!(table.rows.iter().all(|row| !row[0].value.starts_with("species:")));
    }
}
