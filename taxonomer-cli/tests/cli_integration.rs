use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use taxonomer_core::Config;
use taxonomer_evolution::{MigrationMap, MigrationOutcome};
use taxonomer_test::{scenario_family_split, scenario_rename, TestEnvironment};

fn taxonomer_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taxonomer").unwrap();
    cmd.env_remove("TAXONOMER_LOG")
        .env_remove("TAXONOMER_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_help_command() {
    taxonomer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("chain"));
}

#[test]
fn test_diff_text_report() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (old, new) = scenario_rename();
    let old_path = env.write_snapshot(&old)?;
    let new_path = env.write_snapshot(&new)?;

    taxonomer_cmd()
        .arg("diff")
        .arg(&old_path)
        .arg(&new_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Taxonomy transition 2020 → 2021"))
        .stdout(predicate::str::contains("nomenclature:species_rename"))
        .stderr(predicate::str::contains("1 changes"));
    Ok(())
}

#[test]
fn test_diff_json_output_and_map() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (old, new) = scenario_family_split(4);
    let old_path = env.write_snapshot(&old)?;
    let new_path = env.write_snapshot(&new)?;
    let report_path = env.output("report.json");
    let map_path = env.output("map.json");

    taxonomer_cmd()
        .arg("diff")
        .arg(&old_path)
        .arg(&new_path)
        .args(["--format", "json"])
        .arg("--output")
        .arg(&report_path)
        .arg("--map-out")
        .arg(&map_path)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path)?)?;
    assert_eq!(report["records"].as_array().map(Vec::len), Some(4));
    assert_eq!(report["quality_score"], 0.5);

    let map = MigrationMap::read_from_file(&map_path)?;
    assert_eq!(map.from_version, "2020");
    assert_eq!(map.to_version, "2021");
    Ok(())
}

#[test]
fn test_migrate_resolves_split_with_species() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (old, new) = scenario_family_split(4);
    let old_path = env.write_snapshot(&old)?;
    let new_path = env.write_snapshot(&new)?;
    let map_path = env.output("map.json");

    taxonomer_cmd()
        .arg("map")
        .arg(&old_path)
        .arg(&new_path)
        .arg("-o")
        .arg(&map_path)
        .assert()
        .success();

    let output = taxonomer_cmd()
        .arg("migrate")
        .arg("--map")
        .arg(&map_path)
        .args(["--rank", "family", "--name", "Largeviridae"])
        .args(["--species", "Large virus 000"])
        .args(["--from", "2020", "--to", "2021"])
        .output()?;
    assert!(output.status.success());
    let outcome: MigrationOutcome = serde_json::from_slice(&output.stdout)?;
    match outcome {
        MigrationOutcome::Updated { record } => {
            assert_eq!(record.identity.name, "Smallaviridae")
        }
        other => panic!("Expected Updated, got {:?}", other),
    }

    // Without the species key the split stays ambiguous, which is not an error
    taxonomer_cmd()
        .arg("migrate")
        .arg("--map")
        .arg(&map_path)
        .args(["--rank", "family", "--name", "Largeviridae"])
        .args(["--from", "2020", "--to", "2021"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"ambiguous\""));
    Ok(())
}

#[test]
fn test_migrate_batch_records() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (old, new) = scenario_rename();
    let old_path = env.write_snapshot(&old)?;
    let new_path = env.write_snapshot(&new)?;
    let map_path = env.output("map.json");
    let records_path = env.output("records.json");
    std::fs::write(
        &records_path,
        r#"[
            {"identity": {"rank": "species", "name": "Foobar virus"}, "fields": {"host": "bat"}},
            {"identity": {"rank": "genus", "name": "Nowherevirus"}}
        ]"#,
    )?;

    taxonomer_cmd()
        .arg("map")
        .arg(&old_path)
        .arg(&new_path)
        .arg("-o")
        .arg(&map_path)
        .assert()
        .success();

    let output = taxonomer_cmd()
        .arg("migrate")
        .arg("--map")
        .arg(&map_path)
        .arg("--records")
        .arg(&records_path)
        .args(["--from", "2020", "--to", "2021"])
        .output()?;
    assert!(output.status.success());

    let outcomes: Vec<MigrationOutcome> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(outcomes.len(), 2);
    match &outcomes[0] {
        MigrationOutcome::Updated { record } => {
            assert_eq!(record.identity.name, "Foobaz virus");
            assert_eq!(record.fields["host"], "bat");
        }
        other => panic!("Expected Updated, got {:?}", other),
    }
    assert_eq!(outcomes[1], MigrationOutcome::Unmapped);
    Ok(())
}

#[test]
fn test_chain_over_archive() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (old, new) = scenario_rename();
    env.populate_archive([&old, &new])?;
    let map_path = env.output("chain.json");

    taxonomer_cmd()
        .arg("chain")
        .arg("--archive")
        .arg(env.archive_dir())
        .args(["2020", "2021", "-o"])
        .arg(&map_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Migration map 2020 → 2021"));

    let map = MigrationMap::read_from_file(&map_path)?;
    assert_eq!(map.translate_species("Foobar virus"), Some("Foobaz virus"));
    Ok(())
}

#[test]
fn test_check_reports_ranks() -> Result<()> {
    let env = TestEnvironment::new()?;
    let (old, _) = scenario_rename();
    let path = env.write_snapshot(&old)?;

    taxonomer_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("family"))
        .stdout(predicate::str::contains("Mandatory"))
        .stderr(predicate::str::contains("Snapshot 2020 is valid: 1 species"));
    Ok(())
}

#[test]
fn test_exit_codes() -> Result<()> {
    let env = TestEnvironment::new()?;

    // Missing file: I/O
    taxonomer_cmd()
        .arg("check")
        .arg(env.snapshots_dir().join("absent.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error"));

    // Malformed document: serialization
    let garbage = env.snapshots_dir().join("garbage.json");
    std::fs::write(&garbage, "{ \"version\": ")?;
    taxonomer_cmd().arg("check").arg(&garbage).assert().code(4);

    // Duplicate scientific names: integrity
    let duplicate = env.snapshots_dir().join("duplicate.json");
    std::fs::write(
        &duplicate,
        r#"{
            "version": "2020",
            "released": "2020-01-01T00:00:00Z",
            "entities": [
                {"name": "Twin virus", "lineage": {"family": "Xviridae", "genus": "Avirus"}},
                {"name": "Twin virus", "lineage": {"family": "Xviridae", "genus": "Bvirus"}}
            ]
        }"#,
    )?;
    taxonomer_cmd()
        .arg("check")
        .arg(&duplicate)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Twin virus"));

    // Invalid configuration
    let mut config = Config::default();
    config.matching.similarity_threshold = 1.5;
    let config_path = env.write_config(&config)?;
    let (old, new) = scenario_rename();
    taxonomer_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("diff")
        .arg(env.write_snapshot(&old)?)
        .arg(env.write_snapshot(&new)?)
        .assert()
        .code(2);
    Ok(())
}

