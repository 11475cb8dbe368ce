//! Immutable, queryable view of one taxonomy release
//!
//! A snapshot is built once from loader output, validated on construction
//! and never mutated afterwards. Components borrow it for the duration of a
//! comparison.

pub mod document;

pub use document::SnapshotDocument;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use taxonomer_core::{
    IntegrityError, IntegrityErrorKind, Lineage, Rank, TaxonIdentity, TaxonomerResult,
    VersionInfo,
};

/// One classified species record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Scientific name, unique within a snapshot
    pub name: String,
    /// Assigned name for every non-leaf rank the entity has
    #[serde(default)]
    pub lineage: Lineage,
    /// Opaque extras (host list, genome type, ...), carried through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lineage: Lineage::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Assign a non-leaf rank. The leaf is always the scientific name.
    pub fn with_rank(mut self, rank: Rank, name: impl Into<String>) -> Self {
        if !rank.is_leaf() {
            self.lineage.insert(rank, name.into());
        }
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Name assigned at `rank`, the scientific name for the leaf rank
    pub fn rank(&self, rank: Rank) -> Option<&str> {
        if rank.is_leaf() {
            Some(self.name.as_str())
        } else {
            self.lineage.get(&rank).map(String::as_str)
        }
    }

    pub fn identity(&self) -> TaxonIdentity {
        TaxonIdentity::species(self.name.clone())
    }

    /// First lineage rank that is blank or is the leaf rank itself.
    /// Unassigned ranks must be absent, never empty.
    fn invalid_lineage_rank(&self) -> Option<Rank> {
        self.lineage
            .iter()
            .find(|(rank, name)| rank.is_leaf() || name.trim().is_empty())
            .map(|(rank, _)| *rank)
    }

    /// Every taxon the entity belongs to, leaf included, broadest first
    pub fn taxa(&self) -> impl Iterator<Item = TaxonIdentity> + '_ {
        self.lineage
            .iter()
            .map(|(rank, name)| TaxonIdentity::new(*rank, name.clone()))
            .chain(std::iter::once(self.identity()))
    }
}

/// Ranks a loader declares mandatory for one release
///
/// Mandatory ranks differ between releases, so the schema travels with the
/// snapshot instead of being fixed globally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSchema {
    #[serde(default)]
    pub mandatory_ranks: BTreeSet<Rank>,
}

impl SnapshotSchema {
    pub fn new(mandatory_ranks: impl IntoIterator<Item = Rank>) -> Self {
        Self {
            mandatory_ranks: mandatory_ranks.into_iter().filter(|r| !r.is_leaf()).collect(),
        }
    }

    /// Check one entity. Returns the first (mandatory rank, assigned rank)
    /// pair where a rank below a mandatory one is assigned without it.
    fn missing_rank(&self, entity: &Entity) -> Option<(Rank, Rank)> {
        for mandatory in &self.mandatory_ranks {
            if entity.lineage.contains_key(mandatory) {
                continue;
            }
            if let Some(assigned) = entity
                .lineage
                .keys()
                .copied()
                .find(|rank| mandatory.is_above(*rank))
            {
                return Some((*mandatory, assigned));
            }
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    info: VersionInfo,
    schema: SnapshotSchema,
    /// Sorted by scientific name
    entities: Vec<Entity>,
    name_index: HashMap<String, usize>,
    /// Entity positions per taxon, ascending (and therefore name-ordered)
    taxon_index: HashMap<TaxonIdentity, Vec<usize>>,
}

impl Snapshot {
    /// Build a snapshot, enforcing unique names and the schema's mandatory
    /// ranks
    pub fn new(
        info: VersionInfo,
        schema: SnapshotSchema,
        mut entities: Vec<Entity>,
    ) -> TaxonomerResult<Self> {
        if info.version.trim().is_empty() {
            return Err(IntegrityError::new("", IntegrityErrorKind::EmptyVersion).into());
        }

        entities.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(pair) = entities.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(IntegrityError::new(
                info.version.clone(),
                IntegrityErrorKind::DuplicateName {
                    name: pair[0].name.clone(),
                },
            )
            .into());
        }

        for entity in &entities {
            if let Some(rank) = entity.invalid_lineage_rank() {
                return Err(IntegrityError::new(
                    info.version.clone(),
                    IntegrityErrorKind::InvalidLineage {
                        entity: entity.name.clone(),
                        rank,
                    },
                )
                .into());
            }
            if let Some((rank, assigned)) = schema.missing_rank(entity) {
                return Err(IntegrityError::with_context(
                    info.version.clone(),
                    IntegrityErrorKind::MissingMandatoryRank {
                        entity: entity.name.clone(),
                        rank,
                        assigned,
                    },
                    format!("{} declared {} as mandatory", info.version, rank),
                )
                .into());
            }
        }

        let mut name_index = HashMap::with_capacity(entities.len());
        let mut taxon_index: HashMap<TaxonIdentity, Vec<usize>> = HashMap::new();
        for (idx, entity) in entities.iter().enumerate() {
            name_index.insert(entity.name.clone(), idx);
            for taxon in entity.taxa() {
                taxon_index.entry(taxon).or_default().push(idx);
            }
        }

        tracing::debug!(
            version = %info.version,
            entities = entities.len(),
            taxa = taxon_index.len(),
            "Built snapshot"
        );

        Ok(Self {
            info,
            schema,
            entities,
            name_index,
            taxon_index,
        })
    }

    pub fn info(&self) -> &VersionInfo {
        &self.info
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    pub fn schema(&self) -> &SnapshotSchema {
        &self.schema
    }

    /// All entities in stable (scientific name) order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.name_index.get(name).map(|&idx| &self.entities[idx])
    }

    /// All entities under the taxon `(rank, name)`, in name order
    pub fn by_rank(&self, rank: Rank, name: &str) -> Vec<&Entity> {
        self.taxon_index
            .get(&TaxonIdentity::new(rank, name))
            .map(|positions| positions.iter().map(|&idx| &self.entities[idx]).collect())
            .unwrap_or_default()
    }

    pub fn contains_taxon(&self, taxon: &TaxonIdentity) -> bool {
        self.taxon_index.contains_key(taxon)
    }

    /// Distinct taxon names assigned at `rank`, sorted
    pub fn taxa_at(&self, rank: Rank) -> Vec<&str> {
        let names: BTreeSet<&str> = self.entities.iter().filter_map(|e| e.rank(rank)).collect();
        names.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use taxonomer_core::TaxonomerError;

    fn info(version: &str) -> VersionInfo {
        VersionInfo::new(version, Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap())
    }

    fn sample() -> Vec<Entity> {
        vec![
            Entity::new("Beta virus")
                .with_rank(Rank::Family, "Xviridae")
                .with_rank(Rank::Genus, "Betavirus"),
            Entity::new("Alpha virus")
                .with_rank(Rank::Family, "Xviridae")
                .with_rank(Rank::Genus, "Alphavirus"),
            Entity::new("Gamma virus")
                .with_rank(Rank::Family, "Yviridae")
                .with_rank(Rank::Genus, "Gammavirus"),
        ]
    }

    #[test]
    fn test_entities_are_name_ordered() {
        let snapshot = Snapshot::new(info("2021"), SnapshotSchema::default(), sample()).unwrap();
        let names: Vec<&str> = snapshot.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha virus", "Beta virus", "Gamma virus"]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.version(), "2021");
    }

    #[test]
    fn test_queries() {
        let snapshot = Snapshot::new(info("2021"), SnapshotSchema::default(), sample()).unwrap();

        let family: Vec<&str> = snapshot
            .by_rank(Rank::Family, "Xviridae")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(family, vec!["Alpha virus", "Beta virus"]);

        assert_eq!(snapshot.by_rank(Rank::Species, "Gamma virus").len(), 1);
        assert!(snapshot.by_rank(Rank::Order, "Zvirales").is_empty());
        assert!(snapshot.entity("Beta virus").is_some());
        assert!(snapshot.entity("beta virus").is_none());
        assert_eq!(snapshot.taxa_at(Rank::Family), vec!["Xviridae", "Yviridae"]);
        assert!(snapshot.contains_taxon(&TaxonIdentity::new(Rank::Genus, "Alphavirus")));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut entities = sample();
        entities.push(Entity::new("Alpha virus").with_rank(Rank::Family, "Zviridae"));

        match Snapshot::new(info("2021"), SnapshotSchema::default(), entities).unwrap_err() {
            TaxonomerError::Integrity(err) => assert_eq!(
                err.kind,
                IntegrityErrorKind::DuplicateName {
                    name: "Alpha virus".to_string()
                }
            ),
            other => panic!("Expected Integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_mandatory_rank_enforced() {
        let entities = vec![Entity::new("Orphan virus").with_rank(Rank::Genus, "Orphanvirus")];
        let schema = SnapshotSchema::new([Rank::Family]);

        match Snapshot::new(info("2021"), schema, entities).unwrap_err() {
            TaxonomerError::Integrity(err) => assert_eq!(
                err.kind,
                IntegrityErrorKind::MissingMandatoryRank {
                    entity: "Orphan virus".to_string(),
                    rank: Rank::Family,
                    assigned: Rank::Genus,
                }
            ),
            other => panic!("Expected Integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_and_leaf_lineage_entries_rejected() {
        let document = SnapshotDocument::from_json_str(
            r#"{
                "version": "2021",
                "released": "2021-05-01T00:00:00Z",
                "schema": {"mandatory_ranks": ["family"]},
                "entities": [
                    {"name": "Foo virus", "lineage": {"family": "", "genus": "Foovirus"}}
                ]
            }"#,
        )
        .unwrap();
        match document.into_snapshot().unwrap_err() {
            TaxonomerError::Integrity(err) => assert_eq!(
                err.kind,
                IntegrityErrorKind::InvalidLineage {
                    entity: "Foo virus".to_string(),
                    rank: Rank::Family,
                }
            ),
            other => panic!("Expected Integrity error, got {:?}", other),
        }

        let document = SnapshotDocument::from_json_str(
            r#"{
                "version": "2021",
                "released": "2021-05-01T00:00:00Z",
                "entities": [
                    {"name": "Foo virus", "lineage": {"family": "Xviridae", "species": "Bar virus"}}
                ]
            }"#,
        )
        .unwrap();
        match document.into_snapshot().unwrap_err() {
            TaxonomerError::Integrity(err) => assert_eq!(
                err.kind,
                IntegrityErrorKind::InvalidLineage {
                    entity: "Foo virus".to_string(),
                    rank: Rank::Species,
                }
            ),
            other => panic!("Expected Integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_mandatory_rank_only_applies_below_assignment() {
        // Nothing assigned below family, so a missing family is fine
        let entities = vec![Entity::new("Floating virus").with_rank(Rank::Order, "Zvirales")];
        let schema = SnapshotSchema::new([Rank::Family]);
        assert!(Snapshot::new(info("2021"), schema, entities).is_ok());
    }

    #[test]
    fn test_empty_version_rejected() {
        let result = Snapshot::new(info("  "), SnapshotSchema::default(), sample());
        assert!(matches!(result, Err(TaxonomerError::Integrity(_))));
    }

    #[test]
    fn test_leaf_rank_never_stored_in_lineage() {
        let entity = Entity::new("Foo virus").with_rank(Rank::Species, "Other name");
        assert!(entity.lineage.is_empty());
        assert_eq!(entity.rank(Rank::Species), Some("Foo virus"));
    }
}
