//! Core utilities and types shared across all Taxonomer crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{IntegrityError, IntegrityErrorKind, TaxonomerError, TaxonomerResult};

// Re-export core types
pub use types::{differing_ranks, Lineage, Rank, TaxonIdentity, VersionInfo};

/// Version information for the Taxonomer project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
