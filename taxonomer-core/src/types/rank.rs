//! The fixed taxonomic rank hierarchy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One level of the 15-rank hierarchy, ordered from the broadest (realm)
/// to the leaf (species). `Ord` follows that order, so a "higher" rank
/// compares as smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Realm,
    Subrealm,
    Kingdom,
    Subkingdom,
    Phylum,
    Subphylum,
    Class,
    Subclass,
    Order,
    Suborder,
    Family,
    Subfamily,
    Genus,
    Subgenus,
    Species,
}

impl Rank {
    /// All ranks, broadest first
    pub const ALL: [Rank; 15] = [
        Rank::Realm,
        Rank::Subrealm,
        Rank::Kingdom,
        Rank::Subkingdom,
        Rank::Phylum,
        Rank::Subphylum,
        Rank::Class,
        Rank::Subclass,
        Rank::Order,
        Rank::Suborder,
        Rank::Family,
        Rank::Subfamily,
        Rank::Genus,
        Rank::Subgenus,
        Rank::Species,
    ];

    /// The leaf rank. Every entity has one; all other ranks are optional.
    pub const LEAF: Rank = Rank::Species;

    /// Every rank above the leaf, broadest first
    pub fn non_leaf() -> impl DoubleEndedIterator<Item = Rank> {
        Rank::ALL[..14].iter().copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Realm => "realm",
            Rank::Subrealm => "subrealm",
            Rank::Kingdom => "kingdom",
            Rank::Subkingdom => "subkingdom",
            Rank::Phylum => "phylum",
            Rank::Subphylum => "subphylum",
            Rank::Class => "class",
            Rank::Subclass => "subclass",
            Rank::Order => "order",
            Rank::Suborder => "suborder",
            Rank::Family => "family",
            Rank::Subfamily => "subfamily",
            Rank::Genus => "genus",
            Rank::Subgenus => "subgenus",
            Rank::Species => "species",
        }
    }

    /// Position in the hierarchy, 0 for realm
    pub fn depth(&self) -> usize {
        *self as usize
    }

    pub fn is_leaf(&self) -> bool {
        *self == Rank::LEAF
    }

    /// Principal ranks are the ones without a "sub" prefix
    pub fn is_principal(&self) -> bool {
        !self.as_str().starts_with("sub")
    }

    /// True for realm and kingdom, whose changes are always routed to review
    pub fn is_high_level(&self) -> bool {
        matches!(self, Rank::Realm | Rank::Kingdom)
    }

    /// True when `self` sits strictly above `other` in the hierarchy
    pub fn is_above(&self, other: Rank) -> bool {
        *self < other
    }

    /// Ranks strictly above this one, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = Rank> {
        Rank::ALL[..self.depth()].iter().rev().copied()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Rank::ALL
            .iter()
            .copied()
            .find(|rank| rank.as_str() == lowered)
            .ok_or_else(|| format!("Unknown rank: {}", s))
    }
}
