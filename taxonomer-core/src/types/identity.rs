//! Taxon identity types used throughout Taxonomer

use super::rank::Rank;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Assigned name per rank for one entity. Unassigned ranks are absent,
/// never empty strings.
pub type Lineage = BTreeMap<Rank, String>;

/// A named group at one rank, e.g. `(family, "Coronaviridae")`
///
/// Names are case-sensitive and unique only within a rank of a single
/// snapshot, so the rank is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxonIdentity {
    pub rank: Rank,
    pub name: String,
}

impl TaxonIdentity {
    pub fn new(rank: Rank, name: impl Into<String>) -> Self {
        Self {
            rank,
            name: name.into(),
        }
    }

    /// Identity of a species (leaf) record
    pub fn species(name: impl Into<String>) -> Self {
        Self::new(Rank::Species, name)
    }

    pub fn is_species(&self) -> bool {
        self.rank.is_leaf()
    }
}

impl fmt::Display for TaxonIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rank, self.name)
    }
}

/// Ranks at which two lineages disagree, broadest first
///
/// A rank counts as differing when it is present on one side only or holds
/// different names.
pub fn differing_ranks(old: &Lineage, new: &Lineage) -> Vec<Rank> {
    Rank::non_leaf()
        .filter(|rank| old.get(rank) != new.get(rank))
        .collect()
}
