//! Renderers for the generic `Report` type

pub mod csv;
pub mod json;
pub mod text;

pub use csv::render_csv;
pub use json::render_json;
pub use text::render_text;

use crate::report::core::Report;
use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use taxonomer_core::TaxonomerError;

/// Output format selectable from the command line or `[report].format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = TaxonomerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(TaxonomerError::InvalidInput(format!(
                "Unknown output format '{}' (expected text, json or csv)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

/// Render with the chosen format
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report),
        OutputFormat::Csv => render_csv(report),
    }
}
