//! Rendering of real transitions in every output format

use pretty_assertions::assert_eq;
use taxonomer_core::Config;
use taxonomer_evolution::{MigrationMap, TransitionAnalyzer};
use taxonomer_test::{scenario_rank_removal, scenario_rename};
use taxonomer_utils::{render, OutputFormat, Report, Reportable};

#[test]
fn test_text_rendering_of_rank_removal() {
    let (old, new) = scenario_rank_removal(3);
    let diff = TransitionAnalyzer::new(Config::default()).diff(&old, &new);
    let text = render(&diff.to_report(), OutputFormat::Text).unwrap();

    assert!(text.starts_with("Taxonomy transition 2020 → 2021\n"));
    assert!(text.contains("Changes by subtype"));
    assert!(text.contains("restructure:rank_removal: 3"));
    assert!(text.contains("Quality band: excellent"));
    assert!(!text.contains("Findings"));
}

#[test]
fn test_json_rendering_round_trips() {
    let (old, new) = scenario_rename();
    let diff = TransitionAnalyzer::new(Config::default()).diff(&old, &new);
    let report = diff.to_report();

    let json = render(&report, OutputFormat::Json).unwrap();
    let parsed: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.title, report.title);
    assert_eq!(parsed.sections.len(), report.sections.len());
    assert_eq!(parsed.metadata["from"], "2020");
}

#[test]
fn test_csv_rendering_of_migration_map() {
    let (old, new) = scenario_rename();
    let diff = TransitionAnalyzer::new(Config::default()).diff(&old, &new);
    let map = MigrationMap::build(&diff);
    let csv = render(&map.to_report(), OutputFormat::Csv).unwrap();

    assert!(csv.starts_with("# Migration map 2020 → 2021\n"));
    assert!(csv.contains("\"Source\",\"Targets\",\"Cardinality\",\"Ambiguous\"\n"));
    assert!(csv.contains("\"species:Foobar virus\",\"species:Foobaz virus\",\"1:1\",\"no\"\n"));
}
