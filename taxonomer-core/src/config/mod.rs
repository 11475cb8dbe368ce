//! Configuration types for Taxonomer

use crate::types::Rank;
use crate::TaxonomerError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum name similarity for a fuzzy match
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Ancestor ranks that may place two entities in the same candidate pool
    #[serde(default = "default_candidate_ranks")]
    pub candidate_ranks: Vec<Rank>,
    /// Also consider entities that share no ancestor at all
    #[serde(default = "default_allow_global_candidates")]
    pub allow_global_candidates: bool,
    /// Unmatched entity count above which scoring runs on the thread pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Ranks that must be present above any assigned lower rank
    #[serde(default = "default_mandatory_ranks")]
    pub mandatory_ranks: Vec<Rank>,
    /// Matches below this confidence are flagged for review
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,
}

/// Presentation settings. The quality bands only label a score; they never
/// feed back into validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_excellent")]
    pub excellent: f64,
    #[serde(default = "default_good")]
    pub good: f64,
    #[serde(default = "default_fair")]
    pub fair: f64,
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Default root directory of the snapshot archive
    #[serde(default)]
    pub directory: Option<String>,
    /// File extension of snapshot documents inside the archive
    #[serde(default = "default_extension")]
    pub extension: String,
}

// Default value functions
fn default_similarity_threshold() -> f64 { 0.85 }
fn default_candidate_ranks() -> Vec<Rank> { vec![Rank::Genus, Rank::Subfamily, Rank::Family] }
fn default_allow_global_candidates() -> bool { false }
fn default_parallel_threshold() -> usize { 256 }
fn default_mandatory_ranks() -> Vec<Rank> { vec![Rank::Family, Rank::Genus] }
fn default_low_confidence_threshold() -> f64 { 0.9 }
fn default_excellent() -> f64 { 0.9 }
fn default_good() -> f64 { 0.75 }
fn default_fair() -> f64 { 0.5 }
fn default_format() -> String { "text".to_string() }
fn default_extension() -> String { "json".to_string() }

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            candidate_ranks: default_candidate_ranks(),
            allow_global_candidates: default_allow_global_candidates(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mandatory_ranks: default_mandatory_ranks(),
            low_confidence_threshold: default_low_confidence_threshold(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excellent: default_excellent(),
            good: default_good(),
            fair: default_fair(),
            format: default_format(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extension: default_extension(),
        }
    }
}

impl Config {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<(), TaxonomerError> {
        if !(0.0..=1.0).contains(&self.matching.similarity_threshold) {
            return Err(TaxonomerError::Configuration(format!(
                "matching.similarity_threshold must be within [0, 1], got {}",
                self.matching.similarity_threshold
            )));
        }
        if self.matching.candidate_ranks.iter().any(|r| r.is_leaf()) {
            return Err(TaxonomerError::Configuration(
                "matching.candidate_ranks cannot contain the species rank".to_string(),
            ));
        }
        if self.validation.mandatory_ranks.iter().any(|r| r.is_leaf()) {
            return Err(TaxonomerError::Configuration(
                "validation.mandatory_ranks cannot contain the species rank".to_string(),
            ));
        }
        let bands = &self.report;
        if !(bands.excellent >= bands.good && bands.good >= bands.fair) {
            return Err(TaxonomerError::Configuration(
                "report bands must satisfy excellent >= good >= fair".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, TaxonomerError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| TaxonomerError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    tracing::debug!(
        threshold = config.matching.similarity_threshold,
        "Loaded configuration"
    );
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), TaxonomerError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| TaxonomerError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
