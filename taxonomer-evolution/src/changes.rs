//! Change record types
//!
//! Field names here are part of the serialized contract consumed by the
//! reporting layer and must stay stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use taxonomer_core::{Lineage, Rank, TaxonIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Reclassification,
    Restructure,
    Nomenclature,
    Added,
    Removed,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Reclassification => "reclassification",
            ChangeType::Restructure => "restructure",
            ChangeType::Nomenclature => "nomenclature",
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSubtype {
    NewSpecies,
    AbolishedSpecies,
    SpeciesRename,
    TaxonRename,
    RankRemoval,
    RankAddition,
    HighLevelChange,
    FamilyChange,
    GenusChange,
    LineageChange,
    SubfamilyChange,
}

impl ChangeSubtype {
    /// The change type every subtype belongs to
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeSubtype::NewSpecies => ChangeType::Added,
            ChangeSubtype::AbolishedSpecies => ChangeType::Removed,
            ChangeSubtype::SpeciesRename | ChangeSubtype::TaxonRename => ChangeType::Nomenclature,
            ChangeSubtype::RankRemoval | ChangeSubtype::RankAddition => ChangeType::Restructure,
            ChangeSubtype::HighLevelChange
            | ChangeSubtype::FamilyChange
            | ChangeSubtype::GenusChange
            | ChangeSubtype::LineageChange
            | ChangeSubtype::SubfamilyChange => ChangeType::Reclassification,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSubtype::NewSpecies => "new_species",
            ChangeSubtype::AbolishedSpecies => "abolished_species",
            ChangeSubtype::SpeciesRename => "species_rename",
            ChangeSubtype::TaxonRename => "taxon_rename",
            ChangeSubtype::RankRemoval => "rank_removal",
            ChangeSubtype::RankAddition => "rank_addition",
            ChangeSubtype::HighLevelChange => "high_level_change",
            ChangeSubtype::FamilyChange => "family_change",
            ChangeSubtype::GenusChange => "genus_change",
            ChangeSubtype::LineageChange => "lineage_change",
            ChangeSubtype::SubfamilyChange => "subfamily_change",
        }
    }
}

impl fmt::Display for ChangeSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.change_type(), self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Normal,
    Major,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Minor => "minor",
            Severity::Normal => "normal",
            Severity::Major => "major",
            Severity::Critical => "critical",
        })
    }
}

/// Outcome of validation. Ordered so that `max` picks the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Valid,
    Warning,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Valid => "valid",
            Status::Warning => "warning",
            Status::Error => "error",
        })
    }
}

/// Which classification rule produced a record, kept for audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    Unmatched,
    IdenticalLineageRename,
    AncestorRename,
    UniformRankRemoval,
    UniformRankAddition,
    HighLevelDifference,
    FamilyDifference,
    GenusDifference,
    IntermediateRankDifference,
    MinorRankDifference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    Completeness,
    HierarchyConsistency,
    HighLevelPlausibility,
    FamilyWithoutGenus,
    RankSkip,
    LowConfidence,
}

/// A rule that did not pass for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: ValidationRule,
    pub outcome: Status,
    pub message: String,
}

impl RuleViolation {
    pub fn warning(rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            outcome: Status::Warning,
            message: message.into(),
        }
    }

    pub fn error(rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            outcome: Status::Error,
            message: message.into(),
        }
    }
}

/// One classified difference between two snapshots
///
/// A matched pair yields exactly one record however many ranks differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Old-snapshot identity, absent for additions
    pub old: Option<TaxonIdentity>,
    /// New-snapshot identity, absent for removals
    pub new: Option<TaxonIdentity>,
    pub old_lineage: Option<Lineage>,
    pub new_lineage: Option<Lineage>,
    pub change_type: ChangeType,
    pub subtype: ChangeSubtype,
    pub severity: Severity,
    pub confidence: f64,
    pub status: Status,
    pub rule: ClassificationRule,
    /// Non-leaf ranks whose assignment differs between the two sides
    pub changed_ranks: Vec<Rank>,
    pub violations: Vec<RuleViolation>,
}

impl ChangeRecord {
    pub fn old_name(&self) -> Option<&str> {
        self.old.as_ref().map(|id| id.name.as_str())
    }

    pub fn new_name(&self) -> Option<&str> {
        self.new.as_ref().map(|id| id.name.as_str())
    }

    /// `change_type:subtype`, e.g. `nomenclature:species_rename`
    pub fn label(&self) -> String {
        self.subtype.to_string()
    }

    /// Deterministic ordering key: the old name when there is one, then the
    /// new name
    pub fn sort_key(&self) -> (&str, &str) {
        let new = self.new_name().unwrap_or("");
        (self.old_name().unwrap_or(new), new)
    }

    /// Ranks present in the old lineage and absent from the new one
    pub fn removed_ranks(&self) -> Vec<Rank> {
        match (&self.old_lineage, &self.new_lineage) {
            (Some(old), Some(new)) => old.keys().filter(|r| !new.contains_key(r)).copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Ranks absent from the old lineage and present in the new one
    pub fn added_ranks(&self) -> Vec<Rank> {
        match (&self.old_lineage, &self.new_lineage) {
            (Some(old), Some(new)) => new.keys().filter(|r| !old.contains_key(r)).copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Fold a violation in, raising the status if it is more severe
    pub fn record_violation(&mut self, violation: RuleViolation) {
        self.status = self.status.max(violation.outcome);
        self.violations.push(violation);
    }

    pub fn is_matched(&self) -> bool {
        self.old.is_some() && self.new.is_some()
    }
}
