//! The diff report produced for one (old, new) snapshot pair
//!
//! Nothing in here depends on wall-clock time or hash order, so two runs
//! over the same inputs serialize to identical bytes.

use crate::changes::{ChangeRecord, ChangeType, Severity, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taxonomer_core::{Lineage, VersionInfo};

/// An entity matched exactly with an identical lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnchangedEntity {
    pub name: String,
    pub lineage: Lineage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_subtype: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

impl ChangeCounts {
    pub fn tally(records: &[ChangeRecord]) -> Self {
        let mut counts = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            *counts.by_type.entry(record.change_type.to_string()).or_default() += 1;
            *counts.by_subtype.entry(record.label()).or_default() += 1;
            *counts.by_severity.entry(record.severity.to_string()).or_default() += 1;
            *counts.by_status.entry(record.status.to_string()).or_default() += 1;
        }
        counts
    }

    pub fn of_type(&self, change_type: ChangeType) -> usize {
        self.by_type.get(change_type.as_str()).copied().unwrap_or(0)
    }

    pub fn of_severity(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity.to_string()).copied().unwrap_or(0)
    }

    pub fn of_status(&self, status: Status) -> usize {
        self.by_status.get(&status.to_string()).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    pub old: VersionInfo,
    pub new: VersionInfo,
    /// Ordered by old name, then new name
    pub records: Vec<ChangeRecord>,
    /// Ordered by name
    pub unchanged: Vec<UnchangedEntity>,
    pub counts: ChangeCounts,
    pub quality_score: f64,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose status is not `valid`
    pub fn flagged(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(|r| r.status != Status::Valid)
    }

    pub fn records_of_type(&self, change_type: ChangeType) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(move |r| r.change_type == change_type)
    }

    /// Record mentioning `name` on either side
    pub fn record_for(&self, name: &str) -> Option<&ChangeRecord> {
        self.records
            .iter()
            .find(|r| r.old_name() == Some(name) || r.new_name() == Some(name))
    }

    pub fn to_json(&self) -> taxonomer_core::TaxonomerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
