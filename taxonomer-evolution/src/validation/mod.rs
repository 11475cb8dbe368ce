//! Rule checks attached to every classified change
//!
//! Findings are recorded on the records themselves as warnings or errors.
//! Nothing here aborts a comparison.

pub mod quality;

pub use quality::quality_score;

use crate::changes::{ChangeRecord, ChangeSubtype, ChangeType, RuleViolation, Status, ValidationRule};
use std::collections::{BTreeSet, HashSet};
use taxonomer_core::config::ValidationConfig;
use taxonomer_core::{Lineage, Rank, TaxonIdentity};

pub struct Validator {
    config: ValidationConfig,
    mandatory: BTreeSet<Rank>,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        let mandatory = config.mandatory_ranks.iter().copied().filter(|r| !r.is_leaf()).collect();
        Self { config, mandatory }
    }

    /// Run every rule over the records of one transition
    ///
    /// Rank removals excuse hierarchy gaps only for the exact taxon a
    /// `rank_removal` record dropped, so those are collected first.
    pub fn validate(&self, records: &mut [ChangeRecord]) {
        let restructured: HashSet<TaxonIdentity> = records
            .iter()
            .filter(|r| r.subtype == ChangeSubtype::RankRemoval)
            .flat_map(|r| {
                let old = r.old_lineage.as_ref();
                r.removed_ranks().into_iter().filter_map(move |rank| {
                    old.and_then(|l| l.get(&rank))
                        .map(|name| TaxonIdentity::new(rank, name.clone()))
                })
            })
            .collect();

        for record in records.iter_mut() {
            for violation in self.check(record, &restructured) {
                record.record_violation(violation);
            }
        }

        let flagged = records.iter().filter(|r| r.status != Status::Valid).count();
        tracing::debug!(records = records.len(), flagged, "Validated changes");
    }

    fn check(&self, record: &ChangeRecord, restructured: &HashSet<TaxonIdentity>) -> Vec<RuleViolation> {
        let mut violations = Vec::new();
        self.check_completeness(record, &mut violations);
        self.check_hierarchy(record, restructured, &mut violations);
        self.check_plausibility(record, &mut violations);
        self.check_rank_skips(record, restructured, &mut violations);
        self.check_confidence(record, &mut violations);
        violations
    }

    fn check_completeness(&self, record: &ChangeRecord, out: &mut Vec<RuleViolation>) {
        for identity in [&record.old, &record.new].into_iter().flatten() {
            if identity.name.trim().is_empty() {
                out.push(RuleViolation::error(
                    ValidationRule::Completeness,
                    "scientific name is empty",
                ));
            }
        }
    }

    /// Every assigned rank needs the nearest mandatory rank above it
    fn check_hierarchy(
        &self,
        record: &ChangeRecord,
        restructured: &HashSet<TaxonIdentity>,
        out: &mut Vec<RuleViolation>,
    ) {
        let Some(lineage) = &record.new_lineage else {
            return;
        };

        let mut missing = BTreeSet::new();
        for rank in lineage.keys() {
            let Some(required) = rank.ancestors().find(|a| self.mandatory.contains(a)) else {
                continue;
            };
            if lineage.contains_key(&required) || is_expected_removal(record, required, restructured) {
                continue;
            }
            if missing.insert(required) {
                out.push(RuleViolation::error(
                    ValidationRule::HierarchyConsistency,
                    format!("{} is assigned but mandatory rank {} is missing", rank, required),
                ));
            }
        }
    }

    fn check_plausibility(&self, record: &ChangeRecord, out: &mut Vec<RuleViolation>) {
        if !record.is_matched() {
            return;
        }

        if record.change_type != ChangeType::Restructure {
            for rank in record.changed_ranks.iter().filter(|r| r.is_high_level()) {
                out.push(RuleViolation::warning(
                    ValidationRule::HighLevelPlausibility,
                    format!(
                        "{} changed from {} to {}",
                        rank,
                        rank_value(&record.old_lineage, *rank),
                        rank_value(&record.new_lineage, *rank)
                    ),
                ));
            }
        }

        if record.subtype == ChangeSubtype::FamilyChange {
            let genus = record.old_lineage.as_ref().and_then(|l| l.get(&Rank::Genus));
            if genus.is_some() && genus == record.new_lineage.as_ref().and_then(|l| l.get(&Rank::Genus)) {
                out.push(RuleViolation::warning(
                    ValidationRule::FamilyWithoutGenus,
                    format!(
                        "family changed from {} to {} while genus stayed {}",
                        rank_value(&record.old_lineage, Rank::Family),
                        rank_value(&record.new_lineage, Rank::Family),
                        rank_value(&record.old_lineage, Rank::Genus)
                    ),
                ));
            }
        }
    }

    /// A rank that disappeared from between two surviving ranks
    fn check_rank_skips(
        &self,
        record: &ChangeRecord,
        restructured: &HashSet<TaxonIdentity>,
        out: &mut Vec<RuleViolation>,
    ) {
        let Some(new) = &record.new_lineage else {
            return;
        };

        for rank in record.removed_ranks() {
            let above = new.keys().any(|r| r.is_above(rank));
            let below = new.keys().any(|r| rank.is_above(*r));
            if above && below && !is_expected_removal(record, rank, restructured) {
                out.push(RuleViolation::error(
                    ValidationRule::RankSkip,
                    format!(
                        "{} {} was dropped between surviving ranks",
                        rank,
                        rank_value(&record.old_lineage, rank)
                    ),
                ));
            }
        }
    }

    fn check_confidence(&self, record: &ChangeRecord, out: &mut Vec<RuleViolation>) {
        if record.is_matched() && record.confidence < self.config.low_confidence_threshold {
            out.push(RuleViolation::warning(
                ValidationRule::LowConfidence,
                format!(
                    "match confidence {:.3} is below {:.3}",
                    record.confidence, self.config.low_confidence_threshold
                ),
            ));
        }
    }
}

/// The record's own old taxon at `rank` was dropped by a rank removal
fn is_expected_removal(record: &ChangeRecord, rank: Rank, restructured: &HashSet<TaxonIdentity>) -> bool {
    record
        .old_lineage
        .as_ref()
        .and_then(|l| l.get(&rank))
        .map(|name| restructured.contains(&TaxonIdentity::new(rank, name.clone())))
        .unwrap_or(false)
}

fn rank_value(lineage: &Option<Lineage>, rank: Rank) -> &str {
    lineage
        .as_ref()
        .and_then(|l| l.get(&rank))
        .map(String::as_str)
        .unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{ClassificationRule, Severity};

    fn lineage(ranks: &[(Rank, &str)]) -> Lineage {
        ranks.iter().map(|(r, n)| (*r, n.to_string())).collect()
    }

    fn record(
        name: &str,
        old: &[(Rank, &str)],
        new: &[(Rank, &str)],
        subtype: ChangeSubtype,
        confidence: f64,
    ) -> ChangeRecord {
        let old_lineage = lineage(old);
        let new_lineage = lineage(new);
        ChangeRecord {
            old: Some(TaxonIdentity::species(name)),
            new: Some(TaxonIdentity::species(name)),
            changed_ranks: taxonomer_core::types::differing_ranks(&old_lineage, &new_lineage),
            old_lineage: Some(old_lineage),
            new_lineage: Some(new_lineage),
            change_type: subtype.change_type(),
            subtype,
            severity: Severity::Normal,
            confidence,
            status: Status::Valid,
            rule: ClassificationRule::GenusDifference,
            violations: Vec::new(),
        }
    }

    fn validate(records: &mut [ChangeRecord]) {
        Validator::new(ValidationConfig::default()).validate(records);
    }

    fn rules(record: &ChangeRecord) -> Vec<ValidationRule> {
        record.violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn test_clean_record_stays_valid() {
        let mut records = vec![record(
            "A virus",
            &[(Rank::Family, "Xviridae"), (Rank::Genus, "Avirus")],
            &[(Rank::Family, "Xviridae"), (Rank::Genus, "Bvirus")],
            ChangeSubtype::GenusChange,
            1.0,
        )];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Valid);
        assert!(records[0].violations.is_empty());
    }

    #[test]
    fn test_empty_name_is_an_error() {
        let mut records = vec![record(" ", &[], &[], ChangeSubtype::SpeciesRename, 1.0)];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Error);
        assert!(rules(&records[0]).contains(&ValidationRule::Completeness));
    }

    #[test]
    fn test_family_skip_is_an_error() {
        let mut records = vec![record(
            "A virus",
            &[(Rank::Order, "Zvirales"), (Rank::Family, "Xviridae"), (Rank::Genus, "Avirus")],
            &[(Rank::Order, "Zvirales"), (Rank::Genus, "Avirus")],
            ChangeSubtype::FamilyChange,
            1.0,
        )];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Error);
        let fired = rules(&records[0]);
        assert!(fired.contains(&ValidationRule::RankSkip));
        assert!(fired.contains(&ValidationRule::HierarchyConsistency));
    }

    #[test]
    fn test_rank_removal_excuses_the_gap() {
        let mut records = vec![record(
            "A virus",
            &[(Rank::Class, "Aviricetes"), (Rank::Order, "Zvirales"), (Rank::Family, "Xviridae")],
            &[(Rank::Class, "Aviricetes"), (Rank::Family, "Xviridae")],
            ChangeSubtype::RankRemoval,
            1.0,
        )];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Valid, "{:?}", records[0].violations);
    }

    #[test]
    fn test_family_change_with_same_genus_warns() {
        let mut records = vec![record(
            "A virus",
            &[(Rank::Family, "Xviridae"), (Rank::Genus, "Avirus")],
            &[(Rank::Family, "Yviridae"), (Rank::Genus, "Avirus")],
            ChangeSubtype::FamilyChange,
            1.0,
        )];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Warning);
        assert_eq!(rules(&records[0]), vec![ValidationRule::FamilyWithoutGenus]);
    }

    #[test]
    fn test_high_level_change_warns_unless_structural() {
        let mut records = vec![
            record(
                "A virus",
                &[(Rank::Realm, "Ribo"), (Rank::Family, "Xviridae")],
                &[(Rank::Realm, "Duplo"), (Rank::Family, "Xviridae")],
                ChangeSubtype::HighLevelChange,
                1.0,
            ),
            record(
                "B virus",
                &[(Rank::Family, "Xviridae")],
                &[(Rank::Realm, "Ribo"), (Rank::Family, "Xviridae")],
                ChangeSubtype::RankAddition,
                1.0,
            ),
        ];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Warning);
        assert_eq!(rules(&records[0]), vec![ValidationRule::HighLevelPlausibility]);
        assert_eq!(records[1].status, Status::Valid);
    }

    #[test]
    fn test_low_confidence_warns() {
        let mut records = vec![record(
            "A virus",
            &[(Rank::Family, "Xviridae")],
            &[(Rank::Family, "Xviridae")],
            ChangeSubtype::SpeciesRename,
            0.86,
        )];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Warning);
        assert_eq!(rules(&records[0]), vec![ValidationRule::LowConfidence]);
    }

    #[test]
    fn test_unmatched_records_skip_confidence() {
        let mut removed = record("A virus", &[(Rank::Family, "Xviridae")], &[], ChangeSubtype::AbolishedSpecies, 0.0);
        removed.new = None;
        removed.new_lineage = None;
        let mut records = vec![removed];
        validate(&mut records);
        assert_eq!(records[0].status, Status::Valid);
    }
}
