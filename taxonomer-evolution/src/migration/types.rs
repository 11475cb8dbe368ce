//! Migration map data types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use taxonomer_core::TaxonIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:1")]
    ManyToOne,
    #[serde(rename = "N:N")]
    ManyToMany,
}

impl Cardinality {
    /// From the source's out-degree and the largest in-degree among its
    /// targets
    pub fn from_degrees(out_degree: usize, max_in_degree: usize) -> Self {
        match (out_degree > 1, max_in_degree > 1) {
            (false, false) => Cardinality::OneToOne,
            (true, false) => Cardinality::OneToMany,
            (false, true) => Cardinality::ManyToOne,
            (true, true) => Cardinality::ManyToMany,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:N",
            Cardinality::ManyToOne => "N:1",
            Cardinality::ManyToMany => "N:N",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One destination of an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTarget {
    pub identity: TaxonIdentity,
    /// Source-version species names whose reassignment supports this edge
    pub via: BTreeSet<String>,
}

/// Every edge leaving one old identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationEntry {
    pub source: TaxonIdentity,
    /// Sorted by identity
    pub targets: Vec<MigrationTarget>,
    pub cardinality: Cardinality,
    /// Set when some hop behind a composed edge fanned out
    #[serde(default)]
    pub ambiguous_hop: bool,
}

impl MigrationEntry {
    pub fn is_ambiguous(&self) -> bool {
        self.targets.len() > 1 || self.ambiguous_hop
    }

    pub fn target_identities(&self) -> Vec<TaxonIdentity> {
        self.targets.iter().map(|t| t.identity.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationMap {
    pub from_version: String,
    pub to_version: String,
    /// Sorted by source identity
    pub entries: Vec<MigrationEntry>,
}

/// A record from an external dataset tagged with an old identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub identity: TaxonIdentity,
    /// Optional finer-grained key used to resolve fan-outs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    /// Caller data, carried through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl ExternalRecord {
    pub fn new(identity: TaxonIdentity) -> Self {
        Self {
            identity,
            species: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The record rewritten to its single new identity
    Updated { record: ExternalRecord },
    /// No edge for this identity
    Unmapped,
    /// Several possible identities and nothing to choose between them
    Ambiguous { candidates: Vec<TaxonIdentity> },
}

impl MigrationOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, MigrationOutcome::Updated { .. })
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, MigrationOutcome::Ambiguous { .. })
    }
}
