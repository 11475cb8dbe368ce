//! Interpretation of transition quality scores
//!
//! The validator only produces a number. How that number reads to a human
//! depends on the configured `[report]` thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;
use taxonomer_core::config::ReportConfig;

use crate::report::{CellStyle, MetricSeverity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityBand {
    /// Lower bounds are inclusive
    pub fn from_score(score: f64, bands: &ReportConfig) -> Self {
        if score >= bands.excellent {
            QualityBand::Excellent
        } else if score >= bands.good {
            QualityBand::Good
        } else if score >= bands.fair {
            QualityBand::Fair
        } else {
            QualityBand::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityBand::Excellent => "excellent",
            QualityBand::Good => "good",
            QualityBand::Fair => "fair",
            QualityBand::Poor => "poor",
        }
    }

    pub fn severity(&self) -> MetricSeverity {
        match self {
            QualityBand::Excellent => MetricSeverity::Success,
            QualityBand::Good => MetricSeverity::Info,
            QualityBand::Fair => MetricSeverity::Warning,
            QualityBand::Poor => MetricSeverity::Error,
        }
    }

    pub fn cell_style(&self) -> CellStyle {
        match self {
            QualityBand::Excellent => CellStyle::Success,
            QualityBand::Good => CellStyle::Normal,
            QualityBand::Fair => CellStyle::Warning,
            QualityBand::Poor => CellStyle::Error,
        }
    }
}

impl fmt::Display for QualityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_band_boundaries() {
        let bands = ReportConfig::default();
        assert_eq!(QualityBand::from_score(1.0, &bands), QualityBand::Excellent);
        assert_eq!(QualityBand::from_score(0.9, &bands), QualityBand::Excellent);
        assert_eq!(QualityBand::from_score(0.75, &bands), QualityBand::Good);
        assert_eq!(QualityBand::from_score(0.5, &bands), QualityBand::Fair);
        assert_eq!(QualityBand::from_score(0.49, &bands), QualityBand::Poor);
        assert_eq!(QualityBand::from_score(0.0, &bands), QualityBand::Poor);
    }

    #[test]
    fn test_custom_bands() {
        let bands = ReportConfig {
            excellent: 0.99,
            good: 0.95,
            fair: 0.9,
            ..ReportConfig::default()
        };
        assert_eq!(QualityBand::from_score(0.96, &bands), QualityBand::Good);
        assert_eq!(QualityBand::from_score(0.5, &bands), QualityBand::Poor);
    }
}
