//! Custom assertions for diff reports

use std::collections::BTreeMap;
use taxonomer_evolution::{ChangeRecord, ChangeSubtype, DiffReport, Snapshot, Status};

/// Assert every entity of both snapshots appears exactly once, either in a
/// change record or among the unchanged entities
pub fn assert_partition_complete(old: &Snapshot, new: &Snapshot, report: &DiffReport) {
    let mut old_seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut new_seen: BTreeMap<&str, usize> = BTreeMap::new();

    for record in &report.records {
        if let Some(name) = record.old_name() {
            *old_seen.entry(name).or_default() += 1;
        }
        if let Some(name) = record.new_name() {
            *new_seen.entry(name).or_default() += 1;
        }
    }
    for entity in &report.unchanged {
        *old_seen.entry(entity.name.as_str()).or_default() += 1;
        *new_seen.entry(entity.name.as_str()).or_default() += 1;
    }

    for entity in old.entities() {
        let count = old_seen.remove(entity.name.as_str()).unwrap_or(0);
        assert_eq!(
            count, 1,
            "Old entity {:?} appears {} times in the report",
            entity.name, count
        );
    }
    for entity in new.entities() {
        let count = new_seen.remove(entity.name.as_str()).unwrap_or(0);
        assert_eq!(
            count, 1,
            "New entity {:?} appears {} times in the report",
            entity.name, count
        );
    }

    assert!(old_seen.is_empty(), "Report mentions unknown old entities: {:?}", old_seen);
    assert!(new_seen.is_empty(), "Report mentions unknown new entities: {:?}", new_seen);
}

/// Assert the report holds exactly one record, of the given subtype and
/// status, and return it
pub fn assert_single_change(
    report: &DiffReport,
    subtype: ChangeSubtype,
    status: Status,
) -> &ChangeRecord {
    assert_eq!(
        report.records.len(),
        1,
        "Expected a single change, got {:#?}",
        report.records
    );
    let record = &report.records[0];
    assert_eq!(record.subtype, subtype, "Unexpected subtype for {:?}", record);
    assert_eq!(record.status, status, "Unexpected status, violations: {:?}", record.violations);
    record
}

/// Assert every record in the report carries the given subtype and status
pub fn assert_all_changes(report: &DiffReport, subtype: ChangeSubtype, status: Status) {
    for record in &report.records {
        assert_eq!(
            (record.subtype, record.status),
            (subtype, status),
            "Unexpected classification for {:?} -> {:?}: {:?}",
            record.old_name(),
            record.new_name(),
            record.violations
        );
    }
}
