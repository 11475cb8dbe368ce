//! Test utilities for the Taxonomer workspace
//!
//! Snapshot builders, the canonical change scenarios, temporary archive
//! environments and custom assertions shared by the integration tests of
//! every crate.

pub mod assertions;
pub mod environment;
pub mod fixtures;

pub use assertions::{assert_all_changes, assert_partition_complete, assert_single_change};
pub use environment::{TestConfig, TestEnvironment};
pub use fixtures::{
    generate_snapshot, scenario_addition, scenario_family_split, scenario_rank_removal,
    scenario_rename, SnapshotBuilder,
};

pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (safe to call from every test)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TAXONOMER_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Run a test body inside a fresh environment that is removed afterwards
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    f(&env)
}
