//! Taxonomy version diffing and migration
//!
//! Compares two released snapshots of a classification, explains every
//! difference as a rename, a restructure or a real reclassification, and
//! turns the result into a migration map for external datasets.

pub mod archive;
pub mod changes;
pub mod classifier;
pub mod matcher;
pub mod migration;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod validation;

pub use archive::{DirectoryArchive, MemoryArchive, SnapshotArchive};
pub use changes::{
    ChangeRecord, ChangeSubtype, ChangeType, ClassificationRule, RuleViolation, Severity, Status,
    ValidationRule,
};
pub use classifier::{ChangeClassifier, Classification};
pub use matcher::{MatchKind, MatchedPair, Matching, Proximity, TaxonMatcher};
pub use migration::{
    Cardinality, ExternalRecord, MigrationEntry, MigrationMap, MigrationOutcome, MigrationTarget,
};
pub use pipeline::{TransitionAnalyzer, VersionChain};
pub use report::{ChangeCounts, DiffReport, UnchangedEntity};
pub use snapshot::{Entity, Snapshot, SnapshotDocument, SnapshotSchema};
pub use validation::{quality_score, Validator};
