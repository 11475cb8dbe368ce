//! Snapshot builders and the canonical change scenarios

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use taxonomer_core::{Rank, TaxonomerResult, VersionInfo};
use taxonomer_evolution::{Entity, Snapshot, SnapshotSchema};

/// Fluent construction of a snapshot for tests
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    version: String,
    year: i32,
    schema: SnapshotSchema,
    entities: Vec<Entity>,
}

impl SnapshotBuilder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            year: 2020,
            schema: SnapshotSchema::default(),
            entities: Vec::new(),
        }
    }

    /// Release on January 1st of `year`
    pub fn released(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn mandatory(mut self, ranks: impl IntoIterator<Item = Rank>) -> Self {
        self.schema = SnapshotSchema::new(ranks);
        self
    }

    pub fn species(mut self, name: &str, ranks: &[(Rank, &str)]) -> Self {
        let entity = ranks
            .iter()
            .fold(Entity::new(name), |e, (rank, value)| e.with_rank(*rank, *value));
        self.entities.push(entity);
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn try_build(self) -> TaxonomerResult<Snapshot> {
        let released = Utc
            .with_ymd_and_hms(self.year, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Snapshot::new(VersionInfo::new(self.version, released), self.schema, self.entities)
    }

    /// Build, panicking on integrity errors
    pub fn build(self) -> Snapshot {
        self.try_build().expect("fixture snapshot should be valid")
    }
}

/// One species renamed, lineage untouched
pub fn scenario_rename() -> (Snapshot, Snapshot) {
    let lineage = [
        (Rank::Order, "Zvirales"),
        (Rank::Family, "Xviridae"),
        (Rank::Genus, "Foovirus"),
    ];
    let old = SnapshotBuilder::new("2020")
        .released(2020)
        .species("Foobar virus", &lineage)
        .build();
    let new = SnapshotBuilder::new("2021")
        .released(2021)
        .species("Foobaz virus", &lineage)
        .build();
    (old, new)
}

/// Order "Zvirales" dropped from `count` species, nothing else changed
pub fn scenario_rank_removal(count: usize) -> (Snapshot, Snapshot) {
    let mut old = SnapshotBuilder::new("2020").released(2020);
    let mut new = SnapshotBuilder::new("2021").released(2021);
    for i in 0..count {
        let name = format!("Zeta virus {:03}", i);
        let genus = format!("Zeta{}virus", i % 5);
        old = old.species(
            &name,
            &[
                (Rank::Class, "Aviricetes"),
                (Rank::Order, "Zvirales"),
                (Rank::Family, "Xviridae"),
                (Rank::Genus, genus.as_str()),
            ],
        );
        new = new.species(
            &name,
            &[
                (Rank::Class, "Aviricetes"),
                (Rank::Family, "Xviridae"),
                (Rank::Genus, genus.as_str()),
            ],
        );
    }
    (old.build(), new.build())
}

/// Family "Largeviridae" split into "Smallaviridae" and "Smallbviridae",
/// every species keeping its genus
pub fn scenario_family_split(count: usize) -> (Snapshot, Snapshot) {
    let mut old = SnapshotBuilder::new("2020").released(2020);
    let mut new = SnapshotBuilder::new("2021").released(2021);
    for i in 0..count {
        let name = format!("Large virus {:03}", i);
        let (genus, family) = if i % 2 == 0 {
            ("Alphalargevirus", "Smallaviridae")
        } else {
            ("Betalargevirus", "Smallbviridae")
        };
        old = old.species(
            &name,
            &[(Rank::Family, "Largeviridae"), (Rank::Genus, genus)],
        );
        new = new.species(&name, &[(Rank::Family, family), (Rank::Genus, genus)]);
    }
    (old.build(), new.build())
}

/// One species added, everything else identical
pub fn scenario_addition() -> (Snapshot, Snapshot) {
    let existing = [(Rank::Family, "Xviridae"), (Rank::Genus, "Avirus")];
    let old = SnapshotBuilder::new("2020")
        .released(2020)
        .species("Alpha virus", &existing)
        .build();
    let new = SnapshotBuilder::new("2021")
        .released(2021)
        .species("Alpha virus", &existing)
        .species(
            "Novel virus",
            &[(Rank::Family, "Nviridae"), (Rank::Genus, "Novelvirus")],
        )
        .build();
    (old, new)
}

/// Reproducible pseudo-random snapshot: `families` families with up to
/// `max_species` species each, spread over a few genera and orders
pub fn generate_snapshot(version: &str, seed: u64, families: usize, max_species: usize) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = SnapshotBuilder::new(version);
    for f in 0..families {
        let family = format!("Fam{}viridae", f);
        let order = format!("Ord{}virales", rng.gen_range(0..3));
        let species_count = rng.gen_range(1..=max_species.max(1));
        for s in 0..species_count {
            let genus = format!("Gen{}f{}virus", rng.gen_range(0..3), f);
            let name = format!("Species {} {}", f, s);
            builder = builder.species(
                &name,
                &[
                    (Rank::Order, order.as_str()),
                    (Rank::Family, family.as_str()),
                    (Rank::Genus, genus.as_str()),
                ],
            );
        }
    }
    builder.build()
}
