//! Reusable old -> new identity lookup built from a diff report
//!
//! The map never guesses. A fan-out without a species key to resolve it is
//! reported as ambiguous, and composition keeps that ambiguity.

pub mod types;

pub use types::{
    Cardinality, ExternalRecord, MigrationEntry, MigrationMap, MigrationOutcome, MigrationTarget,
};

use crate::report::DiffReport;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use taxonomer_core::{Lineage, TaxonIdentity, TaxonomerError, TaxonomerResult};

/// source -> target -> supporting species names
type EdgeSet = BTreeMap<TaxonIdentity, BTreeMap<TaxonIdentity, BTreeSet<String>>>;

fn add_edge(edges: &mut EdgeSet, source: TaxonIdentity, target: TaxonIdentity, via: &str) {
    edges
        .entry(source)
        .or_default()
        .entry(target)
        .or_default()
        .insert(via.to_string());
}

/// Species edge plus one edge per rank both lineages assign
fn add_lineage_edges(
    edges: &mut EdgeSet,
    old_name: &str,
    new_name: &str,
    old_lineage: &Lineage,
    new_lineage: &Lineage,
) {
    add_edge(
        edges,
        TaxonIdentity::species(old_name),
        TaxonIdentity::species(new_name),
        old_name,
    );
    for (rank, before) in old_lineage {
        if let Some(after) = new_lineage.get(rank) {
            add_edge(
                edges,
                TaxonIdentity::new(*rank, before.clone()),
                TaxonIdentity::new(*rank, after.clone()),
                old_name,
            );
        }
    }
}

impl MigrationMap {
    /// Build the map for one transition
    ///
    /// Matched records and unchanged entities contribute edges. Additions
    /// and removals have nothing to map from or to.
    pub fn build(report: &DiffReport) -> Self {
        let mut edges = EdgeSet::new();

        for record in &report.records {
            if let (Some(old), Some(new), Some(old_lineage), Some(new_lineage)) =
                (&record.old, &record.new, &record.old_lineage, &record.new_lineage)
            {
                add_lineage_edges(&mut edges, &old.name, &new.name, old_lineage, new_lineage);
            }
        }
        for entity in &report.unchanged {
            add_lineage_edges(&mut edges, &entity.name, &entity.name, &entity.lineage, &entity.lineage);
        }

        let map = Self::from_edges(
            report.old.version.clone(),
            report.new.version.clone(),
            edges,
            &BTreeSet::new(),
        );
        tracing::info!(
            from = %map.from_version,
            to = %map.to_version,
            entries = map.entries.len(),
            "Built migration map"
        );
        map
    }

    fn from_edges(
        from_version: String,
        to_version: String,
        edges: EdgeSet,
        ambiguous: &BTreeSet<TaxonIdentity>,
    ) -> Self {
        let mut in_degree: BTreeMap<&TaxonIdentity, usize> = BTreeMap::new();
        for targets in edges.values() {
            for target in targets.keys() {
                *in_degree.entry(target).or_default() += 1;
            }
        }

        let entries = edges
            .iter()
            .map(|(source, targets)| {
                let max_in = targets
                    .keys()
                    .map(|t| in_degree.get(t).copied().unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                MigrationEntry {
                    source: source.clone(),
                    targets: targets
                        .iter()
                        .map(|(identity, via)| MigrationTarget {
                            identity: identity.clone(),
                            via: via.clone(),
                        })
                        .collect(),
                    cardinality: Cardinality::from_degrees(targets.len(), max_in),
                    ambiguous_hop: ambiguous.contains(source),
                }
            })
            .collect();

        Self {
            from_version,
            to_version,
            entries,
        }
    }

    pub fn entry(&self, identity: &TaxonIdentity) -> Option<&MigrationEntry> {
        self.entries
            .binary_search_by(|e| e.source.cmp(identity))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn read_from_file(path: &Path) -> TaxonomerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            TaxonomerError::Serialization(format!("{}: {}", path.display(), e))
        })
    }

    pub fn write_to_file(&self, path: &Path) -> TaxonomerResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn cardinality_counts(&self) -> BTreeMap<Cardinality, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.cardinality).or_default() += 1;
        }
        counts
    }

    /// New name of a species that maps to exactly one species
    pub fn translate_species(&self, name: &str) -> Option<&str> {
        let entry = self.entry(&TaxonIdentity::species(name))?;
        match entry.targets.as_slice() {
            [only] => Some(only.identity.name.as_str()),
            _ => None,
        }
    }

    fn check_versions(&self, from: &str, to: &str) -> TaxonomerResult<()> {
        if from != self.from_version {
            return Err(TaxonomerError::VersionMismatch {
                expected: self.from_version.clone(),
                actual: from.to_string(),
            });
        }
        if to != self.to_version {
            return Err(TaxonomerError::VersionMismatch {
                expected: self.to_version.clone(),
                actual: to.to_string(),
            });
        }
        Ok(())
    }

    /// Rewrite one external record from `from` to `to`
    ///
    /// A species key narrows a fan-out to the targets that species
    /// actually moved into. Anything still not unique comes back as
    /// `Ambiguous` with every candidate.
    pub fn apply(
        &self,
        record: &ExternalRecord,
        from: &str,
        to: &str,
    ) -> TaxonomerResult<MigrationOutcome> {
        self.check_versions(from, to)?;

        let Some(entry) = self.entry(&record.identity) else {
            return Ok(MigrationOutcome::Unmapped);
        };

        let narrowed: Vec<&MigrationTarget> = match &record.species {
            Some(species) if entry.is_ambiguous() => entry
                .targets
                .iter()
                .filter(|t| t.via.contains(species))
                .collect(),
            _ => entry.targets.iter().collect(),
        };

        let resolved = match narrowed.as_slice() {
            [only] if !entry.ambiguous_hop || record.species.is_some() => Some(*only),
            _ => None,
        };

        let Some(target) = resolved else {
            let candidates = if narrowed.is_empty() {
                entry.target_identities()
            } else {
                narrowed.iter().map(|t| t.identity.clone()).collect()
            };
            return Ok(MigrationOutcome::Ambiguous { candidates });
        };

        let mut updated = record.clone();
        updated.identity = target.identity.clone();
        if let Some(species) = record.species.as_deref() {
            if let Some(renamed) = self.translate_species(species) {
                updated.species = Some(renamed.to_string());
            }
        }
        Ok(MigrationOutcome::Updated { record: updated })
    }

    /// Chain this map with the next hop into a `from -> next.to` map
    ///
    /// Edges chain by identity. A composed edge is supported by the species
    /// that travel along both hops, or by the first hop's species when none do.
    /// Sources whose path fanned out at either hop stay flagged as
    /// ambiguous even if the branches converge again.
    pub fn compose(&self, next: &MigrationMap) -> TaxonomerResult<MigrationMap> {
        if self.to_version != next.from_version {
            return Err(TaxonomerError::VersionMismatch {
                expected: self.to_version.clone(),
                actual: next.from_version.clone(),
            });
        }

        let mut edges = EdgeSet::new();
        let mut ambiguous = BTreeSet::new();

        for entry in &self.entries {
            let mut fanned_out = entry.is_ambiguous();
            for first in &entry.targets {
                let Some(onward) = next.entry(&first.identity) else {
                    continue;
                };
                fanned_out |= onward.is_ambiguous();
                for second in &onward.targets {
                    let mut via: BTreeSet<String> = first
                        .via
                        .iter()
                        .filter(|species| {
                            self.translate_species(species)
                                .map_or(false, |carried| second.via.contains(carried))
                        })
                        .cloned()
                        .collect();
                    // Supporting species may turn over between hops; the edge still holds
                    if via.is_empty() {
                        via = first.via.clone();
                    }
                    edges
                        .entry(entry.source.clone())
                        .or_default()
                        .entry(second.identity.clone())
                        .or_default()
                        .extend(via);
                }
            }
            if fanned_out && edges.contains_key(&entry.source) {
                ambiguous.insert(entry.source.clone());
            }
        }

        let composed = Self::from_edges(
            self.from_version.clone(),
            next.to_version.clone(),
            edges,
            &ambiguous,
        );
        tracing::debug!(
            from = %composed.from_version,
            to = %composed.to_version,
            entries = composed.entries.len(),
            ambiguous = ambiguous.len(),
            "Composed migration maps"
        );
        Ok(composed)
    }
}
