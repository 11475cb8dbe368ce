//! Pairing of entities between an old and a new snapshot
//!
//! Exact scientific names pair first. Whatever is left is paired by fuzzy
//! name similarity, but only against entities that share an ancestor taxon,
//! and committed greedily best-first. The result is a 1:1 correspondence.

pub mod similarity;

pub use similarity::name_similarity;

use crate::snapshot::{Entity, Snapshot};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use taxonomer_core::config::MatchingConfig;
use taxonomer_core::{Rank, TaxonIdentity};

/// How close in the tree two matched entities sit
///
/// Ordered so that a shared genus beats a shared family, which beats no
/// shared ancestor at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    Global,
    Shared(Rank),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub old: String,
    pub new: String,
    pub confidence: f64,
    pub kind: MatchKind,
    /// Set for fuzzy matches only
    pub proximity: Option<Proximity>,
}

/// Full outcome of matching two snapshots
#[derive(Debug, Clone, Default)]
pub struct Matching {
    /// Sorted by old name
    pairs: Vec<MatchedPair>,
    by_old: HashMap<String, usize>,
    by_new: HashMap<String, usize>,
    /// Old entities without a counterpart, sorted
    pub unmatched_old: Vec<String>,
    /// New entities without a counterpart, sorted
    pub unmatched_new: Vec<String>,
}

impl Matching {
    fn new(mut pairs: Vec<MatchedPair>, unmatched_old: Vec<String>, unmatched_new: Vec<String>) -> Self {
        pairs.sort_by(|a, b| a.old.cmp(&b.old));
        let by_old = pairs.iter().enumerate().map(|(i, p)| (p.old.clone(), i)).collect();
        let by_new = pairs.iter().enumerate().map(|(i, p)| (p.new.clone(), i)).collect();
        Self {
            pairs,
            by_old,
            by_new,
            unmatched_old,
            unmatched_new,
        }
    }

    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    /// New-snapshot name matched to an old-snapshot name
    pub fn new_for(&self, old: &str) -> Option<&str> {
        self.by_old.get(old).map(|&i| self.pairs[i].new.as_str())
    }

    /// Old-snapshot name matched to a new-snapshot name
    pub fn old_for(&self, new: &str) -> Option<&str> {
        self.by_new.get(new).map(|&i| self.pairs[i].old.as_str())
    }

    pub fn fuzzy_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.kind == MatchKind::Fuzzy).count()
    }
}

/// A scored (old, new) pairing that cleared the similarity threshold
#[derive(Debug, Clone)]
struct Candidate<'a> {
    old: &'a str,
    new: &'a str,
    similarity: f64,
    proximity: Proximity,
}

/// Best first: similarity, then proximity, then names for a stable tie-break
fn candidate_order(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.proximity.cmp(&a.proximity))
        .then_with(|| a.old.cmp(b.old))
        .then_with(|| a.new.cmp(b.new))
}

pub struct TaxonMatcher {
    config: MatchingConfig,
}

impl TaxonMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Produce the 1:1 correspondence between the two snapshots
    pub fn match_snapshots(&self, old: &Snapshot, new: &Snapshot) -> Matching {
        let mut pairs = Vec::new();
        let mut remaining_old: Vec<&Entity> = Vec::new();

        for entity in old.entities() {
            if new.entity(&entity.name).is_some() {
                pairs.push(MatchedPair {
                    old: entity.name.clone(),
                    new: entity.name.clone(),
                    confidence: 1.0,
                    kind: MatchKind::Exact,
                    proximity: None,
                });
            } else {
                remaining_old.push(entity);
            }
        }

        let remaining_new: Vec<&Entity> = new
            .entities()
            .iter()
            .filter(|e| old.entity(&e.name).is_none())
            .collect();

        tracing::debug!(
            exact = pairs.len(),
            old_left = remaining_old.len(),
            new_left = remaining_new.len(),
            "Exact matching pass complete"
        );

        let mut candidates = self.score_candidates(&remaining_old, &remaining_new);
        candidates.sort_by(candidate_order);

        let mut consumed_old: BTreeSet<&str> = BTreeSet::new();
        let mut consumed_new: BTreeSet<&str> = BTreeSet::new();
        for candidate in candidates {
            if consumed_old.contains(candidate.old) || consumed_new.contains(candidate.new) {
                continue;
            }
            consumed_old.insert(candidate.old);
            consumed_new.insert(candidate.new);
            pairs.push(MatchedPair {
                old: candidate.old.to_string(),
                new: candidate.new.to_string(),
                confidence: candidate.similarity,
                kind: MatchKind::Fuzzy,
                proximity: Some(candidate.proximity),
            });
        }

        let unmatched_old: Vec<String> = remaining_old
            .iter()
            .filter(|e| !consumed_old.contains(e.name.as_str()))
            .map(|e| e.name.clone())
            .collect();
        let unmatched_new: Vec<String> = remaining_new
            .iter()
            .filter(|e| !consumed_new.contains(e.name.as_str()))
            .map(|e| e.name.clone())
            .collect();

        let matching = Matching::new(pairs, unmatched_old, unmatched_new);
        tracing::info!(
            old = old.version(),
            new = new.version(),
            matched = matching.pairs().len(),
            fuzzy = matching.fuzzy_count(),
            removed = matching.unmatched_old.len(),
            added = matching.unmatched_new.len(),
            "Matched snapshots"
        );
        matching
    }

    /// Score every (old, candidate) pairing that clears the threshold
    ///
    /// Candidates for an old entity are the new entities sharing one of the
    /// configured ancestor ranks with it. Each old entity is scored
    /// independently, so large sets fan out over the thread pool.
    fn score_candidates<'a>(
        &self,
        remaining_old: &[&'a Entity],
        remaining_new: &[&'a Entity],
    ) -> Vec<Candidate<'a>> {
        if remaining_old.is_empty() || remaining_new.is_empty() {
            return Vec::new();
        }

        let mut pools: HashMap<TaxonIdentity, Vec<&'a Entity>> = HashMap::new();
        for entity in remaining_new {
            for rank in &self.config.candidate_ranks {
                if let Some(name) = entity.lineage.get(rank) {
                    pools
                        .entry(TaxonIdentity::new(*rank, name.clone()))
                        .or_default()
                        .push(*entity);
                }
            }
        }

        let score_one = |old: &&'a Entity| -> Vec<Candidate<'a>> {
            let mut proximity: BTreeMap<&'a str, Proximity> = BTreeMap::new();
            for rank in &self.config.candidate_ranks {
                let Some(name) = old.lineage.get(rank) else {
                    continue;
                };
                let Some(pool) = pools.get(&TaxonIdentity::new(*rank, name.clone())) else {
                    continue;
                };
                for &entity in pool {
                    let shared = Proximity::Shared(*rank);
                    proximity
                        .entry(entity.name.as_str())
                        .and_modify(|p| *p = (*p).max(shared))
                        .or_insert(shared);
                }
            }
            if self.config.allow_global_candidates {
                for &entity in remaining_new {
                    proximity.entry(entity.name.as_str()).or_insert(Proximity::Global);
                }
            }

            proximity
                .into_iter()
                .filter_map(|(new_name, proximity)| {
                    let similarity = name_similarity(&old.name, new_name);
                    (similarity >= self.config.similarity_threshold).then_some(Candidate {
                        old: old.name.as_str(),
                        new: new_name,
                        similarity,
                        proximity,
                    })
                })
                .collect()
        };

        let scored: Vec<Vec<Candidate<'a>>> = if remaining_old.len() > self.config.parallel_threshold {
            remaining_old.par_iter().map(score_one).collect()
        } else {
            remaining_old.iter().map(score_one).collect()
        };

        scored.into_iter().flatten().collect()
    }
}
