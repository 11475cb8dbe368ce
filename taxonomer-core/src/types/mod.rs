//! Core types shared across all Taxonomer modules

pub mod identity;
pub mod rank;
pub mod version;

// Re-export commonly used types at module level
pub use identity::{differing_ranks, Lineage, TaxonIdentity};
pub use rank::Rank;
pub use version::VersionInfo;
