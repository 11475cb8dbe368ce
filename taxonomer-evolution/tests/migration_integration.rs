//! Migration maps across several versions, through memory and directory
//! archives

use taxonomer_core::{Config, Rank, TaxonIdentity};
use taxonomer_evolution::{
    ExternalRecord, MigrationMap, MigrationOutcome, Snapshot, SnapshotArchive, TransitionAnalyzer,
    VersionChain,
};
use taxonomer_test::{init_test_logging, SnapshotBuilder, TestEnvironment};

fn three_versions() -> (Snapshot, Snapshot, Snapshot) {
    let v1 = SnapshotBuilder::new("2019")
        .released(2019)
        .species("Foobar virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Foovirus")])
        .species("Stable virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Stablevirus")])
        .species("Drifter virus", &[(Rank::Family, "Yviridae"), (Rank::Genus, "Driftvirus")])
        .build();
    let v2 = SnapshotBuilder::new("2020")
        .released(2020)
        .species("Foobaz virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Foovirus")])
        .species("Stable virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Stablevirus")])
        .species("Drifter virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Driftvirus")])
        .build();
    let v3 = SnapshotBuilder::new("2021")
        .released(2021)
        .species("Foobaz virus", &[(Rank::Family, "Wviridae"), (Rank::Genus, "Foovirus")])
        .species("Stable virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Stablevirus")])
        .species("Drifter virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Neodriftvirus")])
        .build();
    (v1, v2, v3)
}

fn build(old: &Snapshot, new: &Snapshot) -> MigrationMap {
    MigrationMap::build(&TransitionAnalyzer::new(Config::default()).diff(old, new))
}

/// Apply two maps in sequence, carrying the species key along by hand
fn apply_sequentially(
    first: &MigrationMap,
    second: &MigrationMap,
    record: &ExternalRecord,
) -> MigrationOutcome {
    match first
        .apply(record, &first.from_version, &first.to_version)
        .unwrap()
    {
        MigrationOutcome::Updated { record } => second
            .apply(&record, &second.from_version, &second.to_version)
            .unwrap(),
        other => other,
    }
}

/// Compare composed and sequential application for every taxon of `v1`,
/// with and without a species key. Returns how many records mapped cleanly.
fn check_composition(v1: &Snapshot, v2: &Snapshot, v3: &Snapshot) -> usize {
    let first = build(v1, v2);
    let second = build(v2, v3);
    let composed = first.compose(&second).unwrap();

    let mut checked = 0;
    for entity in v1.entities() {
        for taxon in entity.taxa() {
            let keyed = ExternalRecord::new(taxon.clone()).with_species(entity.name.clone());
            for record in [keyed, ExternalRecord::new(taxon)] {
                let sequential = apply_sequentially(&first, &second, &record);
                if !sequential.is_updated() {
                    continue;
                }
                let direct = composed
                    .apply(&record, v1.version(), v3.version())
                    .unwrap();
                assert_eq!(direct, sequential, "Diverged for {:?}", record);
                checked += 1;
            }
        }
    }
    checked
}

#[test]
fn test_composition_matches_sequential_application() {
    init_test_logging();
    let (v1, v2, v3) = three_versions();
    let checked = check_composition(&v1, &v2, &v3);
    assert!(checked >= 6, "only {} records mapped cleanly", checked);

    // The family outlives every species that supported it in the first hop
    let v1 = SnapshotBuilder::new("1")
        .species("Alpha virus", &[(Rank::Family, "Xviridae")])
        .build();
    let v2 = SnapshotBuilder::new("2")
        .species("Alpha virus", &[(Rank::Family, "Xviridae")])
        .species("Beta virus", &[(Rank::Family, "Xviridae")])
        .build();
    let v3 = SnapshotBuilder::new("3")
        .species("Beta virus", &[(Rank::Family, "Xviridae")])
        .build();
    assert_eq!(check_composition(&v1, &v2, &v3), 2);
}

#[test]
fn test_composed_species_rename() {
    init_test_logging();
    let (v1, v2, v3) = three_versions();
    let composed = build(&v1, &v2).compose(&build(&v2, &v3)).unwrap();

    let record = ExternalRecord::new(TaxonIdentity::species("Foobar virus"))
        .with_field("host", serde_json::json!("bat"));
    match composed.apply(&record, "2019", "2021").unwrap() {
        MigrationOutcome::Updated { record } => {
            assert_eq!(record.identity, TaxonIdentity::species("Foobaz virus"));
            assert_eq!(record.fields["host"], "bat");
        }
        other => panic!("Expected Updated, got {:?}", other),
    }
}

#[test]
fn test_directory_chain_equals_manual_composition() {
    init_test_logging();
    let env = TestEnvironment::new().unwrap();
    let (v1, v2, v3) = three_versions();
    let archive = env.populate_archive([&v1, &v2, &v3]).unwrap();

    let versions: Vec<String> = archive
        .versions()
        .unwrap()
        .into_iter()
        .map(|v| v.version)
        .collect();
    assert_eq!(versions, vec!["2019", "2020", "2021"]);

    let chain = VersionChain::new(&archive, Config::default());
    let reports = chain.reports("2019", "2021").unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].new.version, "2020");

    let chained = chain.migration_map("2019", "2021").unwrap();
    let manual = build(&v1, &v2).compose(&build(&v2, &v3)).unwrap();
    assert_eq!(chained, manual);
}

#[test]
fn test_removed_species_is_unmapped_after_composition() {
    init_test_logging();
    let v1 = SnapshotBuilder::new("1")
        .released(2019)
        .species("Ghost virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Ghostvirus")])
        .species("Other virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Othervirus")])
        .build();
    let v2 = SnapshotBuilder::new("2")
        .released(2020)
        .species("Other virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Othervirus")])
        .build();
    let v3 = SnapshotBuilder::new("3")
        .released(2021)
        .species("Other virus", &[(Rank::Family, "Xviridae"), (Rank::Genus, "Othervirus")])
        .build();
    let composed = build(&v1, &v2).compose(&build(&v2, &v3)).unwrap();
    let outcome = composed
        .apply(
            &ExternalRecord::new(TaxonIdentity::species("Ghost virus")),
            "1",
            "3",
        )
        .unwrap();
    assert_eq!(outcome, MigrationOutcome::Unmapped);
}
