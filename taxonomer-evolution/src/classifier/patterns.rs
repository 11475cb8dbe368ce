//! Subtree-wide patterns detected before any single pair is classified
//!
//! Renames and rank restructures are properties of a whole taxon, not of
//! one entity, so they are detected once over both snapshots and then
//! looked up per pair.

use crate::matcher::Matching;
use crate::snapshot::Snapshot;
use std::collections::{BTreeSet, HashMap, HashSet};
use taxonomer_core::{Rank, TaxonIdentity};

#[derive(Debug, Default)]
pub struct StructuralPatterns {
    /// Old taxon -> new name at the same rank, same set of descendants
    renames: HashMap<TaxonIdentity, String>,
    /// Old taxa whose rank vanished for every matched descendant
    removed_levels: HashSet<TaxonIdentity>,
    /// New taxa whose rank was absent for every matched descendant before
    added_levels: HashSet<TaxonIdentity>,
}

impl StructuralPatterns {
    pub fn detect(old: &Snapshot, new: &Snapshot, matching: &Matching) -> Self {
        let mut patterns = Self::default();

        for rank in Rank::non_leaf() {
            for name in old.taxa_at(rank) {
                let taxon = TaxonIdentity::new(rank, name);
                if let Some(target) = renamed_taxon(old, new, matching, &taxon) {
                    patterns.renames.insert(taxon.clone(), target);
                }

                let counterparts: Vec<_> = old
                    .by_rank(rank, name)
                    .into_iter()
                    .filter_map(|e| matching.new_for(&e.name).and_then(|n| new.entity(n)))
                    .collect();
                if !counterparts.is_empty() && counterparts.iter().all(|e| !e.lineage.contains_key(&rank)) {
                    patterns.removed_levels.insert(taxon);
                }
            }

            for name in new.taxa_at(rank) {
                let counterparts: Vec<_> = new
                    .by_rank(rank, name)
                    .into_iter()
                    .filter_map(|e| matching.old_for(&e.name).and_then(|o| old.entity(o)))
                    .collect();
                if !counterparts.is_empty() && counterparts.iter().all(|e| !e.lineage.contains_key(&rank)) {
                    patterns.added_levels.insert(TaxonIdentity::new(rank, name));
                }
            }
        }

        tracing::debug!(
            renames = patterns.renames.len(),
            removed_levels = patterns.removed_levels.len(),
            added_levels = patterns.added_levels.len(),
            "Detected structural patterns"
        );
        patterns
    }

    /// New name of a renamed old taxon
    pub fn renamed_to(&self, rank: Rank, old_name: &str) -> Option<&str> {
        self.renames
            .get(&TaxonIdentity::new(rank, old_name))
            .map(String::as_str)
    }

    pub fn is_removed_level(&self, rank: Rank, old_name: &str) -> bool {
        self.removed_levels.contains(&TaxonIdentity::new(rank, old_name))
    }

    pub fn is_added_level(&self, rank: Rank, new_name: &str) -> bool {
        self.added_levels.contains(&TaxonIdentity::new(rank, new_name))
    }

    pub fn renames(&self) -> impl Iterator<Item = (&TaxonIdentity, &str)> {
        self.renames.iter().map(|(taxon, name)| (taxon, name.as_str()))
    }
}

/// A taxon counts as renamed when it disappeared, every descendant was
/// matched, and the matched descendants form exactly one new taxon at the
/// same rank whose name did not exist before
fn renamed_taxon(
    old: &Snapshot,
    new: &Snapshot,
    matching: &Matching,
    taxon: &TaxonIdentity,
) -> Option<String> {
    if new.contains_taxon(taxon) {
        return None;
    }

    let descendants: BTreeSet<&str> = old
        .by_rank(taxon.rank, &taxon.name)
        .into_iter()
        .map(|e| matching.new_for(&e.name))
        .collect::<Option<_>>()?;

    let mut targets = descendants
        .iter()
        .map(|name| new.entity(name).and_then(|e| e.lineage.get(&taxon.rank)));
    let target = targets.next()??;
    if targets.any(|t| t != Some(target)) {
        return None;
    }

    if old.contains_taxon(&TaxonIdentity::new(taxon.rank, target.as_str())) {
        return None;
    }

    let regrouped: BTreeSet<&str> = new
        .by_rank(taxon.rank, target)
        .into_iter()
        .map(|e| e.name.as_str())
        .collect();
    (regrouped == descendants).then(|| target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::TaxonMatcher;
    use crate::snapshot::{Entity, SnapshotSchema};
    use chrono::Utc;
    use taxonomer_core::config::MatchingConfig;
    use taxonomer_core::VersionInfo;

    fn snapshot(version: &str, entities: Vec<Entity>) -> Snapshot {
        Snapshot::new(
            VersionInfo::new(version, Utc::now()),
            SnapshotSchema::default(),
            entities,
        )
        .unwrap()
    }

    fn detect(old: &Snapshot, new: &Snapshot) -> StructuralPatterns {
        let matching = TaxonMatcher::new(MatchingConfig::default()).match_snapshots(old, new);
        StructuralPatterns::detect(old, new, &matching)
    }

    #[test]
    fn test_family_rename_detected() {
        let old = snapshot(
            "1",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Oldviridae"),
                Entity::new("B virus").with_rank(Rank::Family, "Oldviridae"),
            ],
        );
        let new = snapshot(
            "2",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Newviridae"),
                Entity::new("B virus").with_rank(Rank::Family, "Newviridae"),
            ],
        );

        let patterns = detect(&old, &new);
        assert_eq!(patterns.renamed_to(Rank::Family, "Oldviridae"), Some("Newviridae"));
    }

    #[test]
    fn test_merge_is_not_a_rename() {
        // The target already holds a descendant of its own
        let old = snapshot(
            "1",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Oldviridae"),
                Entity::new("C virus").with_rank(Rank::Family, "Newviridae"),
            ],
        );
        let new = snapshot(
            "2",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Newviridae"),
                Entity::new("C virus").with_rank(Rank::Family, "Newviridae"),
            ],
        );

        let patterns = detect(&old, &new);
        assert_eq!(patterns.renamed_to(Rank::Family, "Oldviridae"), None);
    }

    #[test]
    fn test_split_is_not_a_rename() {
        let old = snapshot(
            "1",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Oldviridae"),
                Entity::new("B virus").with_rank(Rank::Family, "Oldviridae"),
            ],
        );
        let new = snapshot(
            "2",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Aviridae"),
                Entity::new("B virus").with_rank(Rank::Family, "Bviridae"),
            ],
        );

        let patterns = detect(&old, &new);
        assert_eq!(patterns.renamed_to(Rank::Family, "Oldviridae"), None);
    }

    #[test]
    fn test_uniform_and_partial_level_removal() {
        let old = snapshot(
            "1",
            vec![
                Entity::new("A virus")
                    .with_rank(Rank::Order, "Zvirales")
                    .with_rank(Rank::Family, "Xviridae"),
                Entity::new("B virus")
                    .with_rank(Rank::Order, "Zvirales")
                    .with_rank(Rank::Family, "Xviridae"),
                Entity::new("C virus")
                    .with_rank(Rank::Order, "Yvirales")
                    .with_rank(Rank::Family, "Wviridae"),
                Entity::new("D virus")
                    .with_rank(Rank::Order, "Yvirales")
                    .with_rank(Rank::Family, "Wviridae"),
            ],
        );
        let new = snapshot(
            "2",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Xviridae"),
                Entity::new("B virus").with_rank(Rank::Family, "Xviridae"),
                Entity::new("C virus").with_rank(Rank::Family, "Wviridae"),
                Entity::new("D virus")
                    .with_rank(Rank::Order, "Yvirales")
                    .with_rank(Rank::Family, "Wviridae"),
            ],
        );

        let patterns = detect(&old, &new);
        assert!(patterns.is_removed_level(Rank::Order, "Zvirales"));
        assert!(!patterns.is_removed_level(Rank::Order, "Yvirales"));
    }

    #[test]
    fn test_uniform_level_addition() {
        let old = snapshot(
            "1",
            vec![
                Entity::new("A virus").with_rank(Rank::Family, "Xviridae"),
                Entity::new("B virus").with_rank(Rank::Family, "Xviridae"),
            ],
        );
        let new = snapshot(
            "2",
            vec![
                Entity::new("A virus")
                    .with_rank(Rank::Realm, "Riboviria")
                    .with_rank(Rank::Family, "Xviridae"),
                Entity::new("B virus")
                    .with_rank(Rank::Realm, "Riboviria")
                    .with_rank(Rank::Family, "Xviridae"),
            ],
        );

        let patterns = detect(&old, &new);
        assert!(patterns.is_added_level(Rank::Realm, "Riboviria"));
        assert!(!patterns.is_added_level(Rank::Family, "Xviridae"));
    }
}
