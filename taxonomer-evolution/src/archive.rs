//! Retrieval of snapshots by version identifier

use crate::snapshot::{Snapshot, SnapshotDocument};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use taxonomer_core::{TaxonomerError, TaxonomerResult, VersionInfo};

/// Source of released snapshots
pub trait SnapshotArchive {
    /// Load and validate the snapshot for `version`
    fn load(&self, version: &str) -> TaxonomerResult<Snapshot>;

    /// Every stored version, oldest release first
    fn versions(&self) -> TaxonomerResult<Vec<VersionInfo>>;

    /// Versions from `from` through `to` inclusive, in release order
    fn range(&self, from: &str, to: &str) -> TaxonomerResult<Vec<VersionInfo>> {
        let versions = self.versions()?;
        let position = |version: &str| {
            versions
                .iter()
                .position(|v| v.version == version)
                .ok_or_else(|| TaxonomerError::NotFound(format!("version {}", version)))
        };
        let start = position(from)?;
        let end = position(to)?;
        if start > end {
            return Err(TaxonomerError::InvalidInput(format!(
                "version {} was released after {}",
                from, to
            )));
        }
        Ok(versions[start..=end].to_vec())
    }
}

fn release_order(versions: &mut [VersionInfo]) {
    versions.sort_by(|a, b| {
        a.released
            .cmp(&b.released)
            .then_with(|| a.version.cmp(&b.version))
    });
}

/// Only the fields needed to list a document without building it
#[derive(Deserialize)]
struct DocumentHeader {
    version: String,
    released: DateTime<Utc>,
}

/// One `<version>.<extension>` snapshot document per version
pub struct DirectoryArchive {
    root: PathBuf,
    extension: String,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, version: &str) -> PathBuf {
        self.root.join(format!("{}.{}", version, self.extension))
    }

    /// Write a snapshot into the archive, replacing any previous document
    pub fn store(&self, snapshot: &Snapshot) -> TaxonomerResult<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.document_path(snapshot.version());
        snapshot.to_document().write_to_file(&path)?;
        tracing::debug!(version = snapshot.version(), path = %path.display(), "Stored snapshot");
        Ok(path)
    }
}

impl SnapshotArchive for DirectoryArchive {
    fn load(&self, version: &str) -> TaxonomerResult<Snapshot> {
        let path = self.document_path(version);
        if !path.exists() {
            return Err(TaxonomerError::NotFound(format!(
                "version {} ({})",
                version,
                path.display()
            )));
        }
        let snapshot = SnapshotDocument::read_from_file(&path)?.into_snapshot()?;
        if snapshot.version() != version {
            tracing::warn!(
                requested = version,
                declared = snapshot.version(),
                "Archived document declares a different version"
            );
        }
        Ok(snapshot)
    }

    fn versions(&self) -> TaxonomerResult<Vec<VersionInfo>> {
        if !self.root.is_dir() {
            return Err(TaxonomerError::NotFound(format!(
                "archive directory {}",
                self.root.display()
            )));
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<DocumentHeader>(&content) {
                Ok(header) => {
                    if header.version != stem {
                        tracing::warn!(
                            file = %path.display(),
                            declared = %header.version,
                            "Document version differs from file name, using file name"
                        );
                    }
                    versions.push(VersionInfo::new(stem, header.released));
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable document");
                }
            }
        }

        release_order(&mut versions);
        Ok(versions)
    }
}

/// In-process archive
#[derive(Default)]
pub struct MemoryArchive {
    snapshots: BTreeMap<String, Snapshot>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: Snapshot) {
        self.snapshots.insert(snapshot.version().to_string(), snapshot);
    }

    pub fn with(mut self, snapshot: Snapshot) -> Self {
        self.insert(snapshot);
        self
    }
}

impl SnapshotArchive for MemoryArchive {
    fn load(&self, version: &str) -> TaxonomerResult<Snapshot> {
        self.snapshots
            .get(version)
            .cloned()
            .ok_or_else(|| TaxonomerError::NotFound(format!("version {}", version)))
    }

    fn versions(&self) -> TaxonomerResult<Vec<VersionInfo>> {
        let mut versions: Vec<VersionInfo> = self.snapshots.values().map(|s| s.info().clone()).collect();
        release_order(&mut versions);
        Ok(versions)
    }
}
