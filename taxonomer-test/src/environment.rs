//! Test environment management
//!
//! Provides isolated directories for snapshot documents and archives, with
//! automatic cleanup using RAII.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use taxonomer_core::{save_config, Config};
use taxonomer_evolution::{DirectoryArchive, Snapshot};
use tempfile::TempDir;

/// Configuration for test environment
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Keep the directory after the test (for debugging)
    pub preserve: bool,
    /// Custom prefix for test directories
    pub prefix: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            preserve: false,
            prefix: None,
        }
    }
}

/// Isolated test environment with automatic cleanup
pub struct TestEnvironment {
    temp_dir: Option<TempDir>,
    root_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(config: TestConfig) -> Result<Self> {
        let prefix = config.prefix.as_deref().unwrap_or("taxonomer-test");
        let temp_dir =
            TempDir::with_prefix(prefix).context("Failed to create temporary directory")?;
        let root_path = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(root_path.join("snapshots"))?;
        std::fs::create_dir_all(root_path.join("archive"))?;
        std::fs::create_dir_all(root_path.join("output"))?;

        let temp_dir = if config.preserve {
            let _ = temp_dir.keep();
            None
        } else {
            Some(temp_dir)
        };

        Ok(Self {
            temp_dir,
            root_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.root_path.join("snapshots")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root_path.join("archive")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root_path.join("output")
    }

    /// Path of a file under the output directory
    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Write a snapshot document named after its version
    pub fn write_snapshot(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let path = self
            .snapshots_dir()
            .join(format!("{}.json", snapshot.version()));
        snapshot
            .to_document()
            .write_to_file(&path)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(path)
    }

    /// Directory archive rooted in this environment
    pub fn archive(&self) -> DirectoryArchive {
        DirectoryArchive::new(self.archive_dir(), "json")
    }

    /// Store every snapshot into the environment's archive
    pub fn populate_archive<'a>(
        &self,
        snapshots: impl IntoIterator<Item = &'a Snapshot>,
    ) -> Result<DirectoryArchive> {
        let archive = self.archive();
        for snapshot in snapshots {
            archive.store(snapshot)?;
        }
        Ok(archive)
    }

    pub fn write_config(&self, config: &Config) -> Result<PathBuf> {
        let path = self.root_path.join("taxonomer.toml");
        save_config(&path, config)?;
        Ok(path)
    }

    /// Whether the directory is removed on drop
    pub fn is_temporary(&self) -> bool {
        self.temp_dir.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scenario_rename;
    use taxonomer_evolution::SnapshotArchive;

    #[test]
    fn test_environment_layout_and_cleanup() {
        let root = {
            let env = TestEnvironment::new().unwrap();
            assert!(env.snapshots_dir().is_dir());
            assert!(env.archive_dir().is_dir());
            assert!(env.is_temporary());
            env.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn test_archive_population() {
        let env = TestEnvironment::new().unwrap();
        let (old, new) = scenario_rename();
        let archive = env.populate_archive([&old, &new]).unwrap();
        let versions: Vec<String> = archive.versions().unwrap().into_iter().map(|v| v.version).collect();
        assert_eq!(versions, vec!["2020", "2021"]);

        let path = env.write_snapshot(&old).unwrap();
        assert!(path.ends_with("2020.json"));
    }
}
