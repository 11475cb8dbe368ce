//! Version related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier and release time of one taxonomy version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub released: DateTime<Utc>,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>, released: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            released,
        }
    }
}
