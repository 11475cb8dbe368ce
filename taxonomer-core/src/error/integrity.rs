//! Snapshot integrity error types

use crate::types::Rank;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error raised when a snapshot violates a structural invariant
///
/// A diff over such a snapshot is meaningless, so this aborts the whole
/// comparison rather than being reported per change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityError {
    /// Version identifier of the offending snapshot
    pub version: String,
    /// The specific invariant that was violated
    pub kind: IntegrityErrorKind,
    /// Optional context about where the error occurred
    pub context: Option<String>,
}

/// Specific kinds of integrity violations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityErrorKind {
    /// Two entities share a scientific name
    DuplicateName { name: String },
    /// An entity has a rank assigned below a mandatory rank it lacks
    MissingMandatoryRank {
        entity: String,
        rank: Rank,
        assigned: Rank,
    },
    /// A lineage entry is blank or names the leaf rank
    InvalidLineage { entity: String, rank: Rank },
    /// The snapshot carries no version identifier
    EmptyVersion,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot '{}': ", self.version)?;
        match &self.kind {
            IntegrityErrorKind::DuplicateName { name } => {
                write!(f, "duplicate scientific name '{}'", name)
            }
            IntegrityErrorKind::MissingMandatoryRank {
                entity,
                rank,
                assigned,
            } => write!(
                f,
                "'{}' is assigned a {} but has no {} (mandatory)",
                entity, assigned, rank
            ),
            IntegrityErrorKind::InvalidLineage { entity, rank } if rank.is_leaf() => write!(
                f,
                "'{}' lists {} in its lineage; the leaf is the scientific name",
                entity, rank
            ),
            IntegrityErrorKind::InvalidLineage { entity, rank } => {
                write!(f, "'{}' has a blank {}", entity, rank)
            }
            IntegrityErrorKind::EmptyVersion => write!(f, "missing version identifier"),
        }?;
        if let Some(ctx) = &self.context {
            write!(f, " [{}]", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for IntegrityError {}

impl IntegrityError {
    /// Create a new integrity error
    pub fn new(version: impl Into<String>, kind: IntegrityErrorKind) -> Self {
        Self {
            version: version.into(),
            kind,
            context: None,
        }
    }

    /// Create an integrity error with context
    pub fn with_context(
        version: impl Into<String>,
        kind: IntegrityErrorKind,
        context: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            kind,
            context: Some(context.into()),
        }
    }
}
