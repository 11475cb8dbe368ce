//! JSON interchange form of a snapshot
//!
//! External loaders normalise whatever source layout they read into this
//! document; the engine never sees raw column variants.

use super::{Entity, Snapshot, SnapshotSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use taxonomer_core::{TaxonomerError, TaxonomerResult, VersionInfo};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub version: String,
    pub released: DateTime<Utc>,
    #[serde(default)]
    pub schema: SnapshotSchema,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl SnapshotDocument {
    /// Validate and freeze the document into a snapshot
    pub fn into_snapshot(self) -> TaxonomerResult<Snapshot> {
        Snapshot::new(
            VersionInfo::new(self.version, self.released),
            self.schema,
            self.entities,
        )
    }

    pub fn from_json_str(content: &str) -> TaxonomerResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn read_from_file(path: &Path) -> TaxonomerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|e| match e {
            TaxonomerError::Serialization(msg) => TaxonomerError::Serialization(format!(
                "{}: {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn write_to_file(&self, path: &Path) -> TaxonomerResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Snapshot {
    /// Load and validate a snapshot document from disk
    pub fn load(path: &Path) -> TaxonomerResult<Self> {
        SnapshotDocument::read_from_file(path)?.into_snapshot()
    }

    pub fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            version: self.info.version.clone(),
            released: self.info.released,
            schema: self.schema.clone(),
            entities: self.entities.clone(),
        }
    }
}
