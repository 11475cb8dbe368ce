//! Assigns exactly one change category to every matched or unmatched entity
//!
//! Rules are evaluated top to bottom and the first one that applies wins,
//! so a pair that differs at several ranks still yields a single record.

pub mod patterns;

pub use patterns::StructuralPatterns;

use crate::changes::{ChangeRecord, ChangeSubtype, ClassificationRule, Severity, Status};
use crate::matcher::{MatchedPair, Matching};
use crate::report::UnchangedEntity;
use crate::snapshot::{Entity, Snapshot};
use rayon::prelude::*;
use taxonomer_core::{differing_ranks, Lineage, Rank};

/// Ranks between the high-level ones and family
const INTERMEDIATE_RANKS: [Rank; 8] = [
    Rank::Subrealm,
    Rank::Subkingdom,
    Rank::Phylum,
    Rank::Subphylum,
    Rank::Class,
    Rank::Subclass,
    Rank::Order,
    Rank::Suborder,
];

/// Output of classification: one record per changed entity plus the
/// entities that did not change at all
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub records: Vec<ChangeRecord>,
    pub unchanged: Vec<UnchangedEntity>,
}

enum Outcome {
    Changed(ChangeRecord),
    Unchanged(UnchangedEntity),
}

pub struct ChangeClassifier {
    parallel_threshold: usize,
}

impl Default for ChangeClassifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangeClassifier {
    /// `parallel_threshold` is the pair count above which pairs are
    /// classified on the thread pool
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    pub fn classify(&self, old: &Snapshot, new: &Snapshot, matching: &Matching) -> Classification {
        let patterns = StructuralPatterns::detect(old, new, matching);

        let classify_pair = |pair: &MatchedPair| -> Option<Outcome> {
            let before = old.entity(&pair.old)?;
            let after = new.entity(&pair.new)?;
            Some(classify_matched(before, after, pair.confidence, &patterns))
        };

        let outcomes: Vec<Outcome> = if matching.pairs().len() > self.parallel_threshold {
            matching.pairs().par_iter().filter_map(classify_pair).collect()
        } else {
            matching.pairs().iter().filter_map(classify_pair).collect()
        };

        let mut classification = Classification::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Changed(record) => classification.records.push(record),
                Outcome::Unchanged(entity) => classification.unchanged.push(entity),
            }
        }

        for name in &matching.unmatched_old {
            if let Some(entity) = old.entity(name) {
                classification.records.push(removed(entity));
            }
        }
        for name in &matching.unmatched_new {
            if let Some(entity) = new.entity(name) {
                classification.records.push(added(entity));
            }
        }

        classification
            .records
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        classification.unchanged.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            records = classification.records.len(),
            unchanged = classification.unchanged.len(),
            "Classified changes"
        );
        classification
    }
}

fn base_record(
    old: Option<&Entity>,
    new: Option<&Entity>,
    subtype: ChangeSubtype,
    severity: Severity,
    confidence: f64,
    rule: ClassificationRule,
) -> ChangeRecord {
    let changed_ranks = match (old, new) {
        (Some(before), Some(after)) => differing_ranks(&before.lineage, &after.lineage),
        _ => Vec::new(),
    };
    ChangeRecord {
        old: old.map(Entity::identity),
        new: new.map(Entity::identity),
        old_lineage: old.map(|e| e.lineage.clone()),
        new_lineage: new.map(|e| e.lineage.clone()),
        change_type: subtype.change_type(),
        subtype,
        severity,
        confidence,
        status: Status::Valid,
        rule,
        changed_ranks,
        violations: Vec::new(),
    }
}

fn added(entity: &Entity) -> ChangeRecord {
    base_record(
        None,
        Some(entity),
        ChangeSubtype::NewSpecies,
        Severity::Normal,
        0.0,
        ClassificationRule::Unmatched,
    )
}

fn removed(entity: &Entity) -> ChangeRecord {
    base_record(
        Some(entity),
        None,
        ChangeSubtype::AbolishedSpecies,
        Severity::Major,
        0.0,
        ClassificationRule::Unmatched,
    )
}

fn classify_matched(
    old: &Entity,
    new: &Entity,
    confidence: f64,
    patterns: &StructuralPatterns,
) -> Outcome {
    let changed = differing_ranks(&old.lineage, &new.lineage);
    if changed.is_empty() && old.name == new.name {
        return Outcome::Unchanged(UnchangedEntity {
            name: new.name.clone(),
            lineage: new.lineage.clone(),
        });
    }

    let (subtype, severity, rule) = select_rule(old, new, &changed, patterns);
    let mut record = base_record(Some(old), Some(new), subtype, severity, confidence, rule);
    if subtype == ChangeSubtype::FamilyChange && genus_unchanged(&old.lineage, &new.lineage) {
        record.status = Status::Warning;
    }
    Outcome::Changed(record)
}

/// The decision table. Order matters: the first rule that applies wins.
fn select_rule(
    old: &Entity,
    new: &Entity,
    changed: &[Rank],
    patterns: &StructuralPatterns,
) -> (ChangeSubtype, Severity, ClassificationRule) {
    if changed.is_empty() {
        return (
            ChangeSubtype::SpeciesRename,
            Severity::Minor,
            ClassificationRule::IdenticalLineageRename,
        );
    }

    if old.name == new.name && is_ancestor_rename(&old.lineage, &new.lineage, changed, patterns) {
        return (
            ChangeSubtype::TaxonRename,
            Severity::Minor,
            ClassificationRule::AncestorRename,
        );
    }

    if changed.iter().all(|rank| match (old.lineage.get(rank), new.lineage.get(rank)) {
        (Some(before), None) => patterns.is_removed_level(*rank, before),
        _ => false,
    }) {
        return (
            ChangeSubtype::RankRemoval,
            Severity::Normal,
            ClassificationRule::UniformRankRemoval,
        );
    }

    if changed.iter().all(|rank| match (old.lineage.get(rank), new.lineage.get(rank)) {
        (None, Some(after)) => patterns.is_added_level(*rank, after),
        _ => false,
    }) {
        return (
            ChangeSubtype::RankAddition,
            Severity::Normal,
            ClassificationRule::UniformRankAddition,
        );
    }

    if changed.iter().any(Rank::is_high_level) {
        return (
            ChangeSubtype::HighLevelChange,
            Severity::Critical,
            ClassificationRule::HighLevelDifference,
        );
    }

    if changed.contains(&Rank::Family) {
        return (
            ChangeSubtype::FamilyChange,
            Severity::Major,
            ClassificationRule::FamilyDifference,
        );
    }

    if changed.contains(&Rank::Genus) {
        return (
            ChangeSubtype::GenusChange,
            Severity::Normal,
            ClassificationRule::GenusDifference,
        );
    }

    if changed.iter().any(|rank| INTERMEDIATE_RANKS.contains(rank)) {
        return (
            ChangeSubtype::LineageChange,
            Severity::Major,
            ClassificationRule::IntermediateRankDifference,
        );
    }

    (
        ChangeSubtype::SubfamilyChange,
        Severity::Minor,
        ClassificationRule::MinorRankDifference,
    )
}

fn is_ancestor_rename(
    old: &Lineage,
    new: &Lineage,
    changed: &[Rank],
    patterns: &StructuralPatterns,
) -> bool {
    changed.iter().all(|rank| match (old.get(rank), new.get(rank)) {
        (Some(before), Some(after)) => patterns.renamed_to(*rank, before) == Some(after.as_str()),
        _ => false,
    })
}

fn genus_unchanged(old: &Lineage, new: &Lineage) -> bool {
    match (old.get(&Rank::Genus), new.get(&Rank::Genus)) {
        (Some(before), Some(after)) => before == after,
        _ => false,
    }
}
